use std::fmt::{self, Display};
use std::str::FromStr;

// Helper macro to define aggregate ID newtypes and common trait impls
macro_rules! define_id {
    ($name:ident $(, $extra:ident)*) => {
        #[derive(Debug, Clone, Copy, PartialEq $(, $extra)*)]
        pub struct $name(i64);

        impl $name {
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

    };
}

define_id!(ParticipationId, Eq, Hash);
define_id!(ParticipantId, Eq, Hash);
define_id!(EventId, Eq, Hash);

/// 旧接口传入的布尔标记
///
/// 历史上 present / cancelled 以整数 0 / 1 提交，只在边界层解析，
/// 领域层方法只接受 `bool`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyFlag(bool);

impl LegacyFlag {
    pub fn value(&self) -> bool {
        self.0
    }
}

impl From<bool> for LegacyFlag {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<LegacyFlag> for bool {
    fn from(flag: LegacyFlag) -> Self {
        flag.0
    }
}

impl TryFrom<i64> for LegacyFlag {
    type Error = String;
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LegacyFlag(false)),
            1 => Ok(LegacyFlag(true)),
            _ => Err(format!("invalid value:{}", value)),
        }
    }
}

impl FromStr for LegacyFlag {
    type Err = String;

    /// 接受 "0"/"1" 以及 "true"/"false"（忽略首尾空白与大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            return Ok(LegacyFlag(true));
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Ok(LegacyFlag(false));
        }
        trimmed
            .parse::<i64>()
            .map_err(|_| format!("invalid value:{}", s))
            .and_then(LegacyFlag::try_from)
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create ob_participation table
        manager
            .create_table(
                Table::create()
                    .table(ObParticipation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ObParticipation::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ObParticipation::IdParticipant)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ObParticipation::IdEvent).big_integer().not_null())
                    .col(
                        ColumnDef::new(ObParticipation::Comments)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ObParticipation::Cancelled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ObParticipation::Present)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // (id_participant, id_event) 唯一
        manager
            .create_index(
                Index::create()
                    .name("ob_participation_participant_event_key")
                    .table(ObParticipation::Table)
                    .col(ObParticipation::IdParticipant)
                    .col(ObParticipation::IdEvent)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ob_participation_event")
                    .table(ObParticipation::Table)
                    .col(ObParticipation::IdEvent)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ObParticipation::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ObParticipation {
    Table,
    Id,
    IdParticipant,
    IdEvent,
    Comments,
    Cancelled,
    Present,
}

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_venues::Venues;
use super::m20250601_000002_create_artists::Artists;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Shows carry NOT NULL references to both parents. Deleting a venue
/// cascades to its shows; the artist side mirrors it for schema symmetry.
fn create_shows_table() -> TableCreateStatement {
    Table::create()
        .table(Shows::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Shows::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Shows::VenueId).integer().not_null())
        .col(ColumnDef::new(Shows::ArtistId).integer().not_null())
        .col(ColumnDef::new(Shows::StartTime).timestamp().not_null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_shows_venue_id")
                .from(Shows::Table, Shows::VenueId)
                .to(Venues::Table, Venues::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_shows_artist_id")
                .from(Shows::Table, Shows::ArtistId)
                .to(Artists::Table, Artists::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(create_shows_table()).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shows_venue_id")
                    .table(Shows::Table)
                    .col(Shows::VenueId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shows_artist_id")
                    .table(Shows::Table)
                    .col(Shows::ArtistId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shows::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Shows {
    Table,
    Id,
    VenueId,
    ArtistId,
    StartTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_references_are_not_null() {
        let sql = create_shows_table().to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#""venue_id" integer NOT NULL"#));
        assert!(sql.contains(r#""artist_id" integer NOT NULL"#));
        assert!(sql.contains(r#""start_time" timestamp NOT NULL"#));
    }

    #[test]
    fn test_venue_delete_cascades_to_shows() {
        let sql = create_shows_table().to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#"REFERENCES "venues" ("id") ON DELETE CASCADE"#));
        assert!(sql.contains(r#"REFERENCES "artists" ("id") ON DELETE CASCADE"#));
    }
}

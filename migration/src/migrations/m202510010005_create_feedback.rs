use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010005_create_feedback"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("feedback"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("course_rating")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("instructor_rating")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("course_comment")).text())
                    .col(ColumnDef::new(Alias::new("instructor_comment")).text())
                    .col(ColumnDef::new(Alias::new("anonymous")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("student_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("course_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("instructor_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("submitted_at")).date().not_null())
                    .col(ColumnDef::new(Alias::new("updated_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Alias::new("is_deleted")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("deleted_at")).timestamp())
                    .col(ColumnDef::new(Alias::new("deleted_by")).string())
                    .col(ColumnDef::new(Alias::new("restored_by")).string())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("feedback"), Alias::new("student_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("feedback"), Alias::new("course_id"))
                            .to(Alias::new("courses"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("feedback"), Alias::new("instructor_id"))
                            .to(Alias::new("instructors"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_feedback_course", "course_id"),
            ("idx_feedback_instructor", "instructor_id"),
            ("idx_feedback_submitted_at", "submitted_at"),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Alias::new("feedback"))
                        .col(Alias::new(column))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("feedback")).to_owned())
            .await
    }
}

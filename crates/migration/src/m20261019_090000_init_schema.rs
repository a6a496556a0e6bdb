use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(string_len(Profile::Id, 36).primary_key())
                    .col(string_len_null(Profile::FullName, 200))
                    .col(text_null(Profile::AvatarUrl))
                    // Role enum is represented in app code. 0=student, 1=doctor
                    .col(
                        small_integer(Profile::Role)
                            .check(Expr::col(Profile::Role).gte(0))
                            .check(Expr::col(Profile::Role).lte(1)),
                    )
                    .col(string_len_null(Profile::AcademicId, 64))
                    .col(timestamp(Profile::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Quiz::Table)
                    .if_not_exists()
                    .col(string_len(Quiz::Id, 36).primary_key())
                    .col(string_len(Quiz::Title, 200))
                    // Concurrent creators may pass the pre-insert check with the same code;
                    // this constraint decides which insert wins.
                    .col(string_len(Quiz::Code, 16).unique_key())
                    .col(string_len(Quiz::InstructorId, 36))
                    .col(timestamp_null(Quiz::StartTime))
                    .col(
                        integer_null(Quiz::DurationMins)
                            .check(Expr::col(Quiz::DurationMins).gte(1)),
                    )
                    .col(timestamp(Quiz::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-quizzes-instructor_id")
                            .from(Quiz::Table, Quiz::InstructorId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Submission::Table)
                    .if_not_exists()
                    .col(string_len(Submission::Id, 36).primary_key())
                    .col(string_len(Submission::QuizId, 36))
                    .col(string_len(Submission::StudentId, 36))
                    .col(text(Submission::ImageUrl))
                    // SubmissionStatus enum is represented in app code. 0=pending, 1=graded
                    .col(
                        small_integer(Submission::Status)
                            .default(0)
                            .check(Expr::col(Submission::Status).gte(0))
                            .check(Expr::col(Submission::Status).lte(1)),
                    )
                    .col(
                        small_integer_null(Submission::Grade)
                            .check(Expr::col(Submission::Grade).gte(0))
                            .check(Expr::col(Submission::Grade).lte(10)),
                    )
                    .col(text_null(Submission::Feedback))
                    .col(timestamp(Submission::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Submission::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submissions-quiz_id")
                            .from(Submission::Table, Submission::QuizId)
                            .to(Quiz::Table, Quiz::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submissions-student_id")
                            .from(Submission::Table, Submission::StudentId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_quizzes_instructor_id")
                    .table(Quiz::Table)
                    .col(Quiz::InstructorId)
                    .to_owned(),
            )
            .await?;

        // One answer sheet per student and quiz.
        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_quiz_student")
                    .table(Submission::Table)
                    .col(Submission::QuizId)
                    .col(Submission::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_student_id")
                    .table(Submission::Table)
                    .col(Submission::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_status")
                    .table(Submission::Table)
                    .col(Submission::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Submission::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Quiz::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Profile {
    Table,
    Id,
    FullName,
    AvatarUrl,
    Role,
    AcademicId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Quiz {
    Table,
    Id,
    Title,
    Code,
    InstructorId,
    StartTime,
    DurationMins,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Submission {
    Table,
    Id,
    QuizId,
    StudentId,
    ImageUrl,
    Status,
    Grade,
    Feedback,
    CreatedAt,
    UpdatedAt,
}

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Plans keep the legacy `accounts` table name so local ids can be
        // mirrored verbatim into the remote `plan` table.
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string(Accounts::Name))
                    .col(double(Accounts::Balance).default(0.0))
                    .col(string(Accounts::Icon).default("wallet"))
                    .col(string(Accounts::Color).default("#60A5FA"))
                    .col(timestamp(Accounts::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Entries; legacy `transactions` name matches the remote table.
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string(Transactions::Type))
                    .col(double(Transactions::Amount))
                    .col(string(Transactions::Category))
                    .col(string(Transactions::CategoryIcon).default("circle"))
                    .col(big_integer(Transactions::AccountId))
                    .col(date(Transactions::Date))
                    .col(string(Transactions::Description).default(""))
                    .col(timestamp(Transactions::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_account")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Name,
    Balance,
    Icon,
    Color,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    Type,
    Amount,
    Category,
    CategoryIcon,
    AccountId,
    Date,
    Description,
    CreatedAt,
}

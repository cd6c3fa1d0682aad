//! Catalog seeding command.

use super::CommandError;

/// The default collectible item catalog. Icon files ship with the
/// deployment under the uploads path.
const DEFAULT_ITEMS: &[(&str, &str)] = &[
    ("Lâmpadas", "lampadas.svg"),
    ("Pilhas e Baterias", "baterias.svg"),
    ("Papéis e Papelão", "papeis-papelao.svg"),
    ("Resíduos Eletrônicos", "eletronicos.svg"),
    ("Resíduos Orgânicos", "organicos.svg"),
    ("Óleo de Cozinha", "oleo.svg"),
];

/// Insert the default item catalog. Idempotent: items already present
/// (by title) are left untouched.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert
/// fails.
pub async fn items() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let mut inserted = 0_u64;
    for (title, image) in DEFAULT_ITEMS {
        let result = sqlx::query(
            r"
            INSERT INTO items (title, image)
            VALUES ($1, $2)
            ON CONFLICT (title) DO NOTHING
            ",
        )
        .bind(title)
        .bind(image)
        .execute(&pool)
        .await?;

        inserted += result.rows_affected();
    }

    tracing::info!(
        inserted,
        total = DEFAULT_ITEMS.len(),
        "Item catalog seeded"
    );
    Ok(())
}

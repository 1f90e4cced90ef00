//! SQL access for contract records.

use sqlx::SqlitePool;

use crate::models::contract::{ContractCreate, ContractRow};

const SELECT_FILTERED: &str = "\
SELECT * FROM contracts \
WHERE (?1 IS NULL OR store = ?1) \
  AND (?2 IS NULL OR prenom LIKE ?2 OR nom LIKE ?2 OR numero_secu LIKE ?2 OR adresse LIKE ?2) \
ORDER BY created_at DESC, id DESC \
LIMIT ?3 OFFSET ?4";

const COUNT_FILTERED: &str = "\
SELECT COUNT(*) FROM contracts \
WHERE (?1 IS NULL OR store = ?1) \
  AND (?2 IS NULL OR prenom LIKE ?2 OR nom LIKE ?2 OR numero_secu LIKE ?2 OR adresse LIKE ?2)";

/// Optional filters for the contract listing.
#[derive(Debug, Default)]
pub struct ContractFilter {
    pub store: Option<String>,
    /// Free-text search over prenom / nom / numero_secu / adresse.
    pub q: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

pub async fn insert_contract(
    pool: &SqlitePool,
    payload: &ContractCreate,
) -> Result<ContractRow, sqlx::Error> {
    let id = sqlx::query(
        "INSERT INTO contracts \
         (store, prenom, nom, date_naissance, lieu_naissance, adresse, \
          nationalite, numero_secu, date_debut, status) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'created')",
    )
    .bind(&payload.store)
    .bind(&payload.prenom)
    .bind(&payload.nom)
    .bind(&payload.date_naissance)
    .bind(&payload.lieu_naissance)
    .bind(&payload.adresse)
    .bind(&payload.nationalite)
    .bind(&payload.numero_secu)
    .bind(&payload.date_debut)
    .execute(pool)
    .await?
    .last_insert_rowid();

    sqlx::query_as::<_, ContractRow>("SELECT * FROM contracts WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn fetch_contract(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<ContractRow>, sqlx::Error> {
    sqlx::query_as::<_, ContractRow>("SELECT * FROM contracts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Records the generated document and flips the status.
pub async fn mark_generated(pool: &SqlitePool, id: i64, path: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE contracts SET status = 'generated', generated_doc_path = ? WHERE id = ?")
        .bind(path)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns the filtered page plus the total match count.
pub async fn list_contracts(
    pool: &SqlitePool,
    filter: &ContractFilter,
) -> Result<(Vec<ContractRow>, i64), sqlx::Error> {
    let like = filter.q.as_ref().map(|q| format!("%{q}%"));

    let total: i64 = sqlx::query_scalar(COUNT_FILTERED)
        .bind(&filter.store)
        .bind(&like)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, ContractRow>(SELECT_FILTERED)
        .bind(&filter.store)
        .bind(&like)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

/// All contracts, newest first, for the CSV export.
pub async fn all_contracts(pool: &SqlitePool) -> Result<Vec<ContractRow>, sqlx::Error> {
    sqlx::query_as::<_, ContractRow>("SELECT * FROM contracts ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations};

    async fn test_pool() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn payload(store: &str, prenom: &str, nom: &str) -> ContractCreate {
        ContractCreate {
            store: store.to_string(),
            prenom: prenom.to_string(),
            nom: nom.to_string(),
            date_naissance: "07/06/1998".to_string(),
            lieu_naissance: "Lyon".to_string(),
            adresse: "3 rue des Lilas\n75011 Paris".to_string(),
            nationalite: "Fran\u{e7}aise".to_string(),
            numero_secu: "298067512345678".to_string(),
            date_debut: "01/09/2024".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_fetch_roundtrip() {
        let pool = test_pool().await;
        let row = insert_contract(&pool, &payload("AEJB", "Marie", "DUPONT"))
            .await
            .unwrap();
        assert_eq!(row.status, "created");
        assert!(row.generated_doc_path.is_none());

        let fetched = fetch_contract(&pool, row.id).await.unwrap().unwrap();
        assert_eq!(fetched.nom, "DUPONT");
    }

    #[tokio::test]
    async fn test_fetch_missing_is_none() {
        let pool = test_pool().await;
        assert!(fetch_contract(&pool, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_generated_updates_status_and_path() {
        let pool = test_pool().await;
        let row = insert_contract(&pool, &payload("AEJB", "Marie", "DUPONT"))
            .await
            .unwrap();
        mark_generated(&pool, row.id, "/tmp/contrat_1.pdf").await.unwrap();
        let row = fetch_contract(&pool, row.id).await.unwrap().unwrap();
        assert_eq!(row.status, "generated");
        assert_eq!(row.generated_doc_path.as_deref(), Some("/tmp/contrat_1.pdf"));
    }

    #[tokio::test]
    async fn test_list_filters_by_store_and_text() {
        let pool = test_pool().await;
        insert_contract(&pool, &payload("AEJB", "Marie", "DUPONT")).await.unwrap();
        insert_contract(&pool, &payload("JAB", "Karim", "BENALI")).await.unwrap();
        insert_contract(&pool, &payload("JAB", "L\u{e9}a", "MARTIN")).await.unwrap();

        let (rows, total) = list_contracts(
            &pool,
            &ContractFilter {
                store: Some("JAB".to_string()),
                q: None,
                limit: 100,
                offset: 0,
            },
        )
        .await
        .unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 2);

        let (rows, total) = list_contracts(
            &pool,
            &ContractFilter {
                store: None,
                q: Some("DUPONT".to_string()),
                limit: 100,
                offset: 0,
            },
        )
        .await
        .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].prenom, "Marie");
    }

    #[tokio::test]
    async fn test_list_respects_limit_and_reports_full_total() {
        let pool = test_pool().await;
        for i in 0..5 {
            insert_contract(&pool, &payload("AEJB", &format!("P{i}"), "NOM"))
                .await
                .unwrap();
        }
        let (rows, total) = list_contracts(
            &pool,
            &ContractFilter {
                store: None,
                q: None,
                limit: 2,
                offset: 0,
            },
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(total, 5);
    }
}

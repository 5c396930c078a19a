//! Single-row SQL operations for the `books` table.

use shelf_db::Db;
use sqlx::{QueryBuilder, Sqlite};

use super::models::{Book, BookCreate, BookPatch};

pub struct BookRepo;

impl BookRepo {
    /// Fetch every book in the store's natural order.
    pub async fn list(db: &Db) -> Result<Vec<Book>, sqlx::Error> {
        sqlx::query_as::<_, Book>(
            // language=sqlite
            r#"
            SELECT id, title, author, price, description
            FROM books
            "#,
        )
        .fetch_all(db.pool())
        .await
    }

    /// Insert a new book and return it with the store-assigned id.
    pub async fn create(db: &Db, input: &BookCreate) -> Result<Book, sqlx::Error> {
        sqlx::query_as::<_, Book>(
            // language=sqlite
            r#"
            INSERT INTO books (title, author, price, description)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, title, author, price, description
            "#,
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.price)
        .bind(&input.description)
        .fetch_one(db.pool())
        .await
    }

    pub async fn find_by_id(db: &Db, id: i64) -> Result<Option<Book>, sqlx::Error> {
        sqlx::query_as::<_, Book>(
            // language=sqlite
            r#"
            SELECT id, title, author, price, description
            FROM books
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(db.pool())
        .await
    }

    /// Apply the supplied fields to the row, then re-read it.
    ///
    /// The UPDATE only names columns present in the patch; an empty patch
    /// skips the write entirely. `Ok(None)` means no book has that id.
    pub async fn update(db: &Db, id: i64, patch: &BookPatch) -> Result<Option<Book>, sqlx::Error> {
        if !patch.is_empty() {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE books SET ");
            {
                let mut fields = builder.separated(", ");
                if let Some(title) = &patch.title {
                    fields.push("title = ");
                    fields.push_bind_unseparated(title);
                }
                if let Some(author) = &patch.author {
                    fields.push("author = ");
                    fields.push_bind_unseparated(author);
                }
                if let Some(price) = patch.price {
                    fields.push("price = ");
                    fields.push_bind_unseparated(price);
                }
                if let Some(description) = &patch.description {
                    // `Some(None)` binds NULL and clears the column.
                    fields.push("description = ");
                    fields.push_bind_unseparated(description.clone());
                }
            }
            builder.push(" WHERE id = ");
            builder.push_bind(id);

            builder.build().execute(db.pool()).await?;
        }

        Self::find_by_id(db, id).await
    }

    /// Delete the row; `false` means the deletion affected zero rows.
    pub async fn delete(db: &Db, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            // language=sqlite
            r#"
            DELETE FROM books
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_kernel::Module;

    async fn test_db() -> Db {
        let db = Db::in_memory().await.unwrap();
        let migrations: Vec<_> = crate::modules::books::BooksModule::new()
            .migrations()
            .into_iter()
            .map(|m| ("books".to_string(), m))
            .collect();
        db.run_migrations(&migrations).await.unwrap();
        db
    }

    fn sample() -> BookCreate {
        BookCreate {
            title: "The Left Hand of Darkness".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            price: 12,
            description: None,
        }
    }

    #[tokio::test]
    async fn created_book_gets_sequential_ids() {
        let db = test_db().await;
        let first = BookRepo::create(&db, &sample()).await.unwrap();
        let second = BookRepo::create(&db, &sample()).await.unwrap();
        assert!(first.id > 0);
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn update_with_empty_patch_is_a_plain_read() {
        let db = test_db().await;
        let created = BookRepo::create(&db, &sample()).await.unwrap();

        let unchanged = BookRepo::update(&db, created.id, &BookPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged, created);
    }

    #[tokio::test]
    async fn update_clears_description_only_when_explicitly_null() {
        let db = test_db().await;
        let mut input = sample();
        input.description = Some("hugo winner".to_string());
        let created = BookRepo::create(&db, &input).await.unwrap();

        // Omitted description is preserved across other field updates.
        let patched = BookRepo::update(
            &db,
            created.id,
            &BookPatch {
                price: Some(20),
                ..BookPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(patched.description.as_deref(), Some("hugo winner"));
        assert_eq!(patched.price, 20);

        // An explicit null clears it.
        let cleared = BookRepo::update(
            &db,
            created.id,
            &BookPatch {
                description: Some(None),
                ..BookPatch::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(cleared.description, None);
    }

    #[tokio::test]
    async fn delete_reports_affected_rows() {
        let db = test_db().await;
        let created = BookRepo::create(&db, &sample()).await.unwrap();

        assert!(BookRepo::delete(&db, created.id).await.unwrap());
        assert!(!BookRepo::delete(&db, created.id).await.unwrap());
        assert_eq!(BookRepo::find_by_id(&db, created.id).await.unwrap(), None);
    }
}

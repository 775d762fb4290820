// ==================== USER REPOSITORY ====================
// Single-document operations over the users collection.
// No call spans more than one document and nothing is transactional.

use crate::{database::MongoDB, utils::AppError};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Collection,
};
use std::future::Future;
use std::time::Duration;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a non-empty document and returns the identifier assigned by the store
    async fn create(&self, document: Document) -> Result<ObjectId, AppError>;

    async fn find_one(&self, id: ObjectId) -> Result<Option<Document>, AppError>;

    /// All documents in store order; an empty collection is a valid result
    async fn find_all(&self) -> Result<Vec<Document>, AppError>;

    /// Merge-patches the present fields and returns the matched count.
    /// A match whose values were already equal still counts.
    async fn update(&self, id: ObjectId, patch: Document) -> Result<u64, AppError>;

    /// Returns the deleted count (0 or 1)
    async fn delete(&self, id: ObjectId) -> Result<u64, AppError>;
}

pub struct MongoUserRepository {
    collection: Collection<Document>,
    timeout: Duration,
}

impl MongoUserRepository {
    pub fn new(db: &MongoDB, collection: &str, timeout: Duration) -> Self {
        Self {
            collection: db.collection::<Document>(collection),
            timeout,
        }
    }

    /// Bounds a store call by the configured deadline
    async fn bounded<T, F>(&self, operation: &str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, mongodb::error::Error>> + Send,
    {
        with_deadline(operation, self.timeout, fut).await
    }
}

/// A call still pending at the deadline is a `DatabaseError`, like any driver failure
pub(crate) async fn with_deadline<T, F>(
    operation: &str,
    timeout: Duration,
    fut: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, mongodb::error::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::DatabaseError(format!(
            "{} timed out after {:?}",
            operation, timeout
        ))),
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, document: Document) -> Result<ObjectId, AppError> {
        if document.is_empty() {
            return Err(AppError::MissingData);
        }

        let result = self
            .bounded("insert_one", async {
                self.collection.insert_one(document).await
            })
            .await?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::DatabaseError(format!(
                "Inserted id is not an ObjectId: {}",
                result.inserted_id
            ))
        })
    }

    async fn find_one(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
        self.bounded("find_one", async {
            self.collection.find_one(doc! { "_id": id }).await
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Document>, AppError> {
        self.bounded("find", async {
            match self.collection.find(doc! {}).await {
                Ok(cursor) => cursor.try_collect::<Vec<Document>>().await,
                Err(e) => Err(e),
            }
        })
        .await
    }

    async fn update(&self, id: ObjectId, patch: Document) -> Result<u64, AppError> {
        if patch.is_empty() {
            return Err(AppError::MissingData);
        }

        let result = self
            .bounded("update_one", async {
                self.collection
                    .update_one(doc! { "_id": id }, doc! { "$set": patch })
                    .await
            })
            .await?;

        Ok(result.matched_count)
    }

    async fn delete(&self, id: ObjectId) -> Result<u64, AppError> {
        let result = self
            .bounded("delete_one", async {
                self.collection.delete_one(doc! { "_id": id }).await
            })
            .await?;

        Ok(result.deleted_count)
    }
}

/// In-process repository used by handler tests
#[cfg(test)]
pub mod memory {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryUserRepository {
        documents: Mutex<Vec<Document>>,
    }

    impl MemoryUserRepository {
        pub fn len(&self) -> usize {
            self.documents.lock().unwrap().len()
        }
    }

    pub fn has_id(document: &Document, id: &ObjectId) -> bool {
        document.get_object_id("_id").map(|v| &v == id).unwrap_or(false)
    }

    #[async_trait]
    impl UserRepository for MemoryUserRepository {
        async fn create(&self, document: Document) -> Result<ObjectId, AppError> {
            if document.is_empty() {
                return Err(AppError::MissingData);
            }
            let id = ObjectId::new();
            let mut stored = doc! { "_id": id };
            for (key, value) in document {
                stored.insert(key, value);
            }
            self.documents.lock().unwrap().push(stored);
            Ok(id)
        }

        async fn find_one(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
            let documents = self.documents.lock().unwrap();
            Ok(documents.iter().find(|d| has_id(d, &id)).cloned())
        }

        async fn find_all(&self) -> Result<Vec<Document>, AppError> {
            Ok(self.documents.lock().unwrap().clone())
        }

        async fn update(&self, id: ObjectId, patch: Document) -> Result<u64, AppError> {
            if patch.is_empty() {
                return Err(AppError::MissingData);
            }
            let mut documents = self.documents.lock().unwrap();
            match documents.iter_mut().find(|d| has_id(d, &id)) {
                Some(stored) => {
                    for (key, value) in patch {
                        stored.insert(key, value);
                    }
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn delete(&self, id: ObjectId) -> Result<u64, AppError> {
            let mut documents = self.documents.lock().unwrap();
            let before = documents.len();
            documents.retain(|d| !has_id(d, &id));
            Ok((before - documents.len()) as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::has_id;
    use super::*;

    async fn live_repository() -> MongoUserRepository {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/user_service_test".to_string());
        let db = MongoDB::new(&uri, Duration::from_secs(2))
            .await
            .expect("MongoDB must be running");
        MongoUserRepository::new(&db, "users_repository_test", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_store_call_past_deadline_is_database_error() {
        use actix_web::{http::StatusCode, ResponseError};

        let err = with_deadline(
            "find_one",
            Duration::from_millis(10),
            std::future::pending::<Result<(), mongodb::error::Error>>(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::DatabaseError(ref msg) if msg.starts_with("find_one timed out")));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Database error");
    }

    #[tokio::test]
    async fn test_store_call_within_deadline_passes_through() {
        let value = with_deadline("count", Duration::from_secs(1), async {
            Ok::<_, mongodb::error::Error>(7u64)
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongo_crud_cycle() {
        let repo = live_repository().await;

        let id = repo
            .create(doc! { "name": "Ana", "role": "staff" })
            .await
            .unwrap();

        let stored = repo.find_one(id).await.unwrap().unwrap();
        assert_eq!(stored, doc! { "_id": id, "name": "Ana", "role": "staff" });

        // Matched, not modified: identical values still count
        assert_eq!(repo.update(id, doc! { "role": "staff" }).await.unwrap(), 1);
        assert_eq!(repo.update(ObjectId::new(), doc! { "role": "x" }).await.unwrap(), 0);

        assert!(repo.find_all().await.unwrap().iter().any(|d| has_id(d, &id)));

        assert_eq!(repo.delete(id).await.unwrap(), 1);
        assert_eq!(repo.delete(id).await.unwrap(), 0);
        assert!(repo.find_one(id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongo_create_rejects_empty_document() {
        let repo = live_repository().await;
        assert!(matches!(
            repo.create(Document::new()).await,
            Err(AppError::MissingData)
        ));
    }
}

// ==================== MONGODB STORES ====================
// Implementação dos traits de store sobre as collections do MongoDB

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, to_bson, to_document};
use mongodb::options::ReturnDocument;

use super::{
    MongoDB, NoteStore, PairingStore, StoreError, TaskStore, UserStore, NOTES, PAIRINGS, USERS,
    USER_TASKS,
};
use crate::models::{pair_key, Note, NotePatch, Pairing, Task, User, UserTasks};

#[async_trait]
impl UserStore for MongoDB {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        self.collection::<User>(USERS).insert_one(user).await?;
        Ok(())
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .collection::<User>(USERS)
            .find_one(doc! { "user_id": user_id })
            .await?)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .collection::<User>(USERS)
            .find_one(doc! { "code": code })
            .await?)
    }

    async fn set_push_token(&self, user_id: &str, token: &str) -> Result<(), StoreError> {
        let result = self
            .collection::<User>(USERS)
            .update_one(
                doc! { "user_id": user_id },
                doc! { "$set": { "push_token": token } },
            )
            .await?;

        if result.matched_count == 0 {
            log::debug!("ℹ️  Push token update matched no user: {}", user_id);
        }

        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        name: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let mut set = doc! {};
        if let Some(name) = name {
            set.insert("name", name);
        }
        if let Some(avatar) = avatar {
            set.insert("avatar", avatar);
        }

        let users = self.collection::<User>(USERS);

        if set.is_empty() {
            return Ok(users.find_one(doc! { "user_id": user_id }).await?);
        }

        Ok(users
            .find_one_and_update(doc! { "user_id": user_id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.collection::<User>(USERS)
            .delete_one(doc! { "user_id": user_id })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PairingStore for MongoDB {
    async fn insert(&self, pairing: &Pairing) -> Result<(), StoreError> {
        self.collection::<Pairing>(PAIRINGS).insert_one(pairing).await?;
        Ok(())
    }

    async fn find_for_user(&self, user_id: &str) -> Result<Option<Pairing>, StoreError> {
        Ok(self
            .collection::<Pairing>(PAIRINGS)
            .find_one(doc! { "$or": [{ "user_a": user_id }, { "user_b": user_id }] })
            .sort(doc! { "created_at": 1 })
            .await?)
    }

    async fn find_between(&self, a: &str, b: &str) -> Result<Option<Pairing>, StoreError> {
        Ok(self
            .collection::<Pairing>(PAIRINGS)
            .find_one(doc! { "pair_key": pair_key(a, b) })
            .await?)
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<u64, StoreError> {
        let result = self
            .collection::<Pairing>(PAIRINGS)
            .delete_many(doc! { "$or": [{ "user_a": user_id }, { "user_b": user_id }] })
            .await?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl NoteStore for MongoDB {
    async fn insert(&self, note: &Note) -> Result<(), StoreError> {
        self.collection::<Note>(NOTES).insert_one(note).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Note>, StoreError> {
        Ok(self.collection::<Note>(NOTES).find_one(doc! { "id": id }).await?)
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Note>, StoreError> {
        let cursor = self
            .collection::<Note>(NOTES)
            .find(doc! { "userId": user_id })
            .sort(doc! { "timestamp": -1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn latest_for_owner(&self, user_id: &str) -> Result<Option<Note>, StoreError> {
        Ok(self
            .collection::<Note>(NOTES)
            .find_one(doc! { "userId": user_id })
            .sort(doc! { "timestamp": -1 })
            .await?)
    }

    async fn update(&self, id: &str, patch: &NotePatch) -> Result<Option<Note>, StoreError> {
        let notes = self.collection::<Note>(NOTES);

        if patch.is_empty() {
            return Ok(notes.find_one(doc! { "id": id }).await?);
        }

        let set = to_document(patch)?;

        Ok(notes
            .find_one_and_update(doc! { "id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.collection::<Note>(NOTES).delete_one(doc! { "id": id }).await?;
        Ok(())
    }

    async fn delete_by_owner(&self, user_id: &str) -> Result<u64, StoreError> {
        let result = self
            .collection::<Note>(NOTES)
            .delete_many(doc! { "userId": user_id })
            .await?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl TaskStore for MongoDB {
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        let doc = self
            .collection::<UserTasks>(USER_TASKS)
            .find_one(doc! { "user_id": user_id })
            .await?;

        // A ordem do array é a ordem da lista: não reordenar por timestamp
        Ok(doc.map(|d| d.tasks).unwrap_or_default())
    }

    async fn prepend(&self, task: &Task) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp_millis();
        let entry = to_bson(task)?;

        self.collection::<UserTasks>(USER_TASKS)
            .update_one(
                doc! { "user_id": &task.user_id },
                doc! {
                    "$push": { "tasks": { "$each": [entry], "$position": 0 } },
                    "$set": { "updated_at": now },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn replace_all(&self, user_id: &str, tasks: &[Task]) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp_millis();

        // Um único update no documento do usuário: o MongoDB aplica atomicamente,
        // nunca fica uma lista pela metade.
        self.collection::<UserTasks>(USER_TASKS)
            .update_one(
                doc! { "user_id": user_id },
                doc! { "$set": { "tasks": to_bson(tasks)?, "updated_at": now } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn delete_by_owner(&self, user_id: &str) -> Result<(), StoreError> {
        self.collection::<UserTasks>(USER_TASKS)
            .delete_one(doc! { "user_id": user_id })
            .await?;
        Ok(())
    }
}

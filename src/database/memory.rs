// In-memory stores used by the test suite. Same contracts as the MongoDB
// implementation, including the unique pair key and unique invite code.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{NoteStore, PairingStore, StoreError, TaskStore, UserStore};
use crate::models::{pair_key, Note, NotePatch, Pairing, Task, User};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    pairings: Mutex<Vec<Pairing>>,
    notes: Mutex<Vec<Note>>,
    tasks: Mutex<Vec<Task>>,
}

impl MemoryStore {
    pub fn pairing_count(&self) -> usize {
        self.pairings.lock().unwrap().len()
    }

    pub fn all_tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.code == user.code || u.user_id == user.user_id) {
            return Err(StoreError::Duplicate(format!("user code {}", user.code)));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.code == code).cloned())
    }

    async fn set_push_token(&self, user_id: &str, token: &str) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.user_id == user_id) {
            user.push_token = Some(token.to_string());
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        name: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            user.name = Some(name.to_string());
        }
        if let Some(avatar) = avatar {
            user.avatar = Some(avatar.to_string());
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.users.lock().unwrap().retain(|u| u.user_id != user_id);
        Ok(())
    }
}

#[async_trait]
impl PairingStore for MemoryStore {
    async fn insert(&self, pairing: &Pairing) -> Result<(), StoreError> {
        let mut pairings = self.pairings.lock().unwrap();
        if pairings.iter().any(|p| p.pair_key == pairing.pair_key) {
            return Err(StoreError::Duplicate(pairing.pair_key.clone()));
        }
        pairings.push(pairing.clone());
        Ok(())
    }

    async fn find_for_user(&self, user_id: &str) -> Result<Option<Pairing>, StoreError> {
        let pairings = self.pairings.lock().unwrap();
        Ok(pairings
            .iter()
            .filter(|p| p.involves(user_id))
            .min_by_key(|p| p.created_at)
            .cloned())
    }

    async fn find_between(&self, a: &str, b: &str) -> Result<Option<Pairing>, StoreError> {
        let key = pair_key(a, b);
        let pairings = self.pairings.lock().unwrap();
        Ok(pairings.iter().find(|p| p.pair_key == key).cloned())
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<u64, StoreError> {
        let mut pairings = self.pairings.lock().unwrap();
        let before = pairings.len();
        pairings.retain(|p| !p.involves(user_id));
        Ok((before - pairings.len()) as u64)
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn insert(&self, note: &Note) -> Result<(), StoreError> {
        let mut notes = self.notes.lock().unwrap();
        if notes.iter().any(|n| n.id == note.id) {
            return Err(StoreError::Duplicate(note.id.clone()));
        }
        notes.push(note.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Note>, StoreError> {
        let notes = self.notes.lock().unwrap();
        Ok(notes.iter().find(|n| n.id == id).cloned())
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Note>, StoreError> {
        let notes = self.notes.lock().unwrap();
        let mut owned: Vec<Note> = notes.iter().filter(|n| n.user_id == user_id).cloned().collect();
        owned.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(owned)
    }

    async fn latest_for_owner(&self, user_id: &str) -> Result<Option<Note>, StoreError> {
        Ok(NoteStore::list_by_owner(self, user_id).await?.into_iter().next())
    }

    async fn update(&self, id: &str, patch: &NotePatch) -> Result<Option<Note>, StoreError> {
        let mut notes = self.notes.lock().unwrap();
        let Some(note) = notes.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        patch.apply_to(note);
        Ok(Some(note.clone()))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.notes.lock().unwrap().retain(|n| n.id != id);
        Ok(())
    }

    async fn delete_by_owner(&self, user_id: &str) -> Result<u64, StoreError> {
        let mut notes = self.notes.lock().unwrap();
        let before = notes.len();
        notes.retain(|n| n.user_id != user_id);
        Ok((before - notes.len()) as u64)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.iter().filter(|t| t.user_id == user_id).cloned().collect())
    }

    async fn prepend(&self, task: &Task) -> Result<(), StoreError> {
        self.tasks.lock().unwrap().insert(0, task.clone());
        Ok(())
    }

    async fn replace_all(&self, user_id: &str, new_tasks: &[Task]) -> Result<(), StoreError> {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.retain(|t| t.user_id != user_id);
        tasks.extend_from_slice(new_tasks);
        Ok(())
    }

    async fn delete_by_owner(&self, user_id: &str) -> Result<(), StoreError> {
        self.tasks.lock().unwrap().retain(|t| t.user_id != user_id);
        Ok(())
    }
}

/// Rejects the first `collisions` user inserts as duplicate invite codes.
pub struct CollidingUsers {
    pub inner: Arc<MemoryStore>,
    collisions: usize,
    pub attempts: AtomicUsize,
}

impl CollidingUsers {
    pub fn new(inner: Arc<MemoryStore>, collisions: usize) -> Self {
        Self {
            inner,
            collisions,
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl UserStore for CollidingUsers {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) < self.collisions {
            return Err(StoreError::Duplicate(format!("code {}", user.code)));
        }
        UserStore::insert(self.inner.as_ref(), user).await
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        UserStore::find_by_id(self.inner.as_ref(), user_id).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<User>, StoreError> {
        self.inner.find_by_code(code).await
    }

    async fn set_push_token(&self, user_id: &str, token: &str) -> Result<(), StoreError> {
        self.inner.set_push_token(user_id, token).await
    }

    async fn update_profile(
        &self,
        user_id: &str,
        name: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        self.inner.update_profile(user_id, name, avatar).await
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        UserStore::delete(self.inner.as_ref(), user_id).await
    }
}

/// Never sees an existing pairing on the pre-check, like a connect racing
/// another one: only the unique pair key catches the duplicate.
pub struct RacingPairings {
    pub inner: Arc<MemoryStore>,
}

#[async_trait]
impl PairingStore for RacingPairings {
    async fn insert(&self, pairing: &Pairing) -> Result<(), StoreError> {
        PairingStore::insert(self.inner.as_ref(), pairing).await
    }

    async fn find_for_user(&self, user_id: &str) -> Result<Option<Pairing>, StoreError> {
        self.inner.find_for_user(user_id).await
    }

    async fn find_between(&self, _a: &str, _b: &str) -> Result<Option<Pairing>, StoreError> {
        Ok(None)
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<u64, StoreError> {
        self.inner.delete_for_user(user_id).await
    }
}

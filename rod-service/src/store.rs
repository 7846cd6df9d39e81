use std::collections::HashMap;

use rod_solver::model::Structure;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory project storage keyed by project id
///
/// Owned by the router state; projects live as long as the process.
#[derive(Debug, Default)]
pub struct ProjectStore {
    projects: RwLock<HashMap<Uuid, Structure>>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new project and return its id
    pub async fn create(&self, structure: Structure) -> Uuid {
        let id = Uuid::new_v4();
        self.projects.write().await.insert(id, structure);
        tracing::debug!("Created project {}", id);
        id
    }

    /// A copy of the stored project
    pub async fn get(&self, id: Uuid) -> Option<Structure> {
        self.projects.read().await.get(&id).cloned()
    }

    /// Replace an existing project; returns false when the id is unknown
    pub async fn update(&self, id: Uuid, structure: Structure) -> bool {
        match self.projects.write().await.get_mut(&id) {
            Some(slot) => {
                *slot = structure;
                true
            }
            None => false,
        }
    }

    pub async fn exists(&self, id: Uuid) -> bool {
        self.projects.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.projects.read().await.len()
    }
}

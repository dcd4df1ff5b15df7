use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use remote::{Endpoint, PredictClient, replies};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

//
// ─── SELECTION STATE ───────────────────────────────────────────────────────────
//

/// Folder and file choices offered by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub folders: Vec<String>,
    pub files: Vec<String>,
    pub selected_folder: Option<String>,
    pub selected_file: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Loads folder and file choices, keeping the first of each selected.
pub struct FileSelectionService {
    client: Arc<dyn PredictClient>,
    state: Mutex<SelectionState>,
}

impl FileSelectionService {
    #[must_use]
    pub fn new(client: Arc<dyn PredictClient>) -> Self {
        Self {
            client,
            state: Mutex::new(SelectionState::default()),
        }
    }

    /// Fetch the folder list, select the first folder and load its files.
    pub async fn load_folders(&self) -> bool {
        self.begin_load();
        let folders = self.fetch_choices(Endpoint::GetFolders, Vec::new()).await;
        let folders = match folders {
            Ok(folders) => folders,
            Err(message) => {
                self.fail(message);
                return false;
            }
        };

        let first = folders.first().cloned();
        debug!(count = folders.len(), "folders loaded");
        {
            let mut state = self.state();
            state.folders = folders;
            state.selected_folder = first.clone();
            state.loading = false;
        }

        match first {
            Some(folder) => self.load_files(&folder).await,
            None => {
                let mut state = self.state();
                state.files.clear();
                state.selected_file = None;
                true
            }
        }
    }

    /// Select a folder and reload its files.
    pub async fn select_folder(&self, folder: &str) -> bool {
        self.state().selected_folder = Some(folder.to_owned()).filter(|f| !f.is_empty());
        self.load_files(folder).await
    }

    /// Fetch the files of `folder` and select the first one. An empty folder
    /// name clears the file list.
    pub async fn load_files(&self, folder: &str) -> bool {
        if folder.is_empty() {
            let mut state = self.state();
            state.files.clear();
            state.selected_file = None;
            return true;
        }

        self.begin_load();
        let files = self
            .fetch_choices(Endpoint::OnFolderChange, vec![json!(folder)])
            .await;
        match files {
            Ok(files) => {
                debug!(folder, count = files.len(), "files loaded");
                let mut state = self.state();
                state.selected_file = files.first().cloned();
                state.files = files;
                state.loading = false;
                true
            }
            Err(message) => {
                self.fail(message);
                false
            }
        }
    }

    pub fn select_file(&self, file: &str) {
        self.state().selected_file = Some(file.to_owned()).filter(|f| !f.is_empty());
    }

    pub fn reset(&self) {
        *self.state() = SelectionState::default();
    }

    #[must_use]
    pub fn snapshot(&self) -> SelectionState {
        self.state().clone()
    }

    async fn fetch_choices(
        &self,
        endpoint: Endpoint,
        args: Vec<Value>,
    ) -> Result<Vec<String>, String> {
        let reply = self
            .client
            .predict(endpoint, args)
            .await
            .map_err(|e| e.to_string())?;
        replies::choices(endpoint, &reply).map_err(|e| e.to_string())
    }

    fn begin_load(&self) {
        let mut state = self.state();
        state.loading = true;
        state.error = None;
    }

    fn fail(&self, message: String) {
        warn!(error = %message, "file selection failed");
        let mut state = self.state();
        state.loading = false;
        state.error = Some(message);
    }

    fn state(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

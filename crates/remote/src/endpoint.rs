use std::fmt;

/// Named backend endpoints reachable through a predict call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GetFolders,
    OnFolderChange,
    LoadWordList,
    PlayWordPronunciation,
    PlayPronunciation,
    StartLearning,
    NextWord,
    MarkAsKnown,
    ResetAndRestart,
}

impl Endpoint {
    pub const ALL: [Endpoint; 9] = [
        Endpoint::GetFolders,
        Endpoint::OnFolderChange,
        Endpoint::LoadWordList,
        Endpoint::PlayWordPronunciation,
        Endpoint::PlayPronunciation,
        Endpoint::StartLearning,
        Endpoint::NextWord,
        Endpoint::MarkAsKnown,
        Endpoint::ResetAndRestart,
    ];

    /// Route as written by callers, e.g. `/start_learning`.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::GetFolders => "/get_folders",
            Endpoint::OnFolderChange => "/on_folder_change",
            Endpoint::LoadWordList => "/load_word_list",
            Endpoint::PlayWordPronunciation => "/play_word_pronunciation",
            Endpoint::PlayPronunciation => "/play_pronunciation",
            Endpoint::StartLearning => "/start_learning",
            Endpoint::NextWord => "/next_word",
            Endpoint::MarkAsKnown => "/mark_as_known",
            Endpoint::ResetAndRestart => "/reset_and_restart",
        }
    }

    /// Route without the leading slash, as used in call URLs.
    #[must_use]
    pub fn api_name(self) -> &'static str {
        self.path().trim_start_matches('/')
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

//! A loaded word book: prepared study lists plus the starred-book actions.

use crate::error::Result;
use crate::repository::WordRepository;
use std::sync::Arc;
use wordbook_core::{starred, BookProgress, SortMode, StudyList, Word, WordListPreparer};

pub struct BookSession {
    book_id: String,
    repository: Arc<dyn WordRepository>,
    preparer: WordListPreparer,
}

impl BookSession {
    /// Fetch words and study status for `book_id` and prepare its lists.
    pub async fn load(
        repository: Arc<dyn WordRepository>,
        book_id: impl Into<String>,
        sort_mode: SortMode,
    ) -> Result<Self> {
        let mut preparer = WordListPreparer::default();
        preparer.set_sort_mode(sort_mode);
        let mut session = Self {
            book_id: book_id.into(),
            repository,
            preparer,
        };
        session.reload().await?;
        Ok(session)
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    /// Fetch words and status again, keeping the sort mode.
    pub async fn reload(&mut self) -> Result<()> {
        let (words, statuses) = tokio::try_join!(
            self.repository.fetch_words(&self.book_id),
            self.repository.fetch_study_status(&self.book_id),
        )?;
        tracing::info!(
            book_id = %self.book_id,
            words = words.len(),
            statuses = statuses.len(),
            "book loaded"
        );
        self.preparer.set_words(words, &statuses);
        Ok(())
    }

    pub fn words(&self) -> &[Word] {
        self.preparer.words()
    }

    pub fn lists(&self) -> &[StudyList] {
        self.preparer.lists()
    }

    pub fn list(&self, number: usize) -> Result<&StudyList> {
        Ok(self.preparer.list(number)?)
    }

    pub fn progress(&self) -> BookProgress {
        self.preparer.progress()
    }

    pub fn sort_mode(&self) -> SortMode {
        self.preparer.sort_mode()
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.preparer.set_sort_mode(mode);
    }

    /// Reset the book's study record and reload everything.
    pub async fn clear_record(&mut self) -> Result<()> {
        self.repository.clear_study_record(&self.book_id).await?;
        self.reload().await
    }

    pub fn starred(&self) -> Vec<Word> {
        starred::starred_words(self.preparer.words())
    }

    /// Remove a word from the starred book. The local change is kept even if
    /// the repository rejects it.
    pub async fn unstar(&mut self, word_id: &str) -> Result<()> {
        self.preparer.update_word(word_id, |w| w.is_starred = false)?;
        let update = starred::unstar(word_id);
        if let Err(e) = self.repository.update_study_status(&[update]).await {
            tracing::warn!(word_id, error = %e, "unstar failed");
        }
        Ok(())
    }

    /// Unstar every starred word in one batch.
    pub async fn clear_starred(&mut self) {
        let batch = starred::clear_all(self.preparer.words());
        if batch.is_empty() {
            return;
        }
        let ids = batch.iter().map(|u| u.word_id.as_str());
        self.preparer.update_words(ids, |w| w.is_starred = false);
        if let Err(e) = self.repository.update_study_status(&batch).await {
            tracing::warn!(count = batch.len(), error = %e, "clearing starred words failed");
        }
    }
}

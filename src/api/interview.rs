//! Interview setup — submit the interview parameters and page through the
//! generated questions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GatewayError;
use crate::gateway::Gateway;

/// The backend generates this many questions per page.
pub const QUESTIONS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewType {
    Technical,
    #[serde(rename = "HR")]
    Hr,
    Behavioral,
    #[serde(rename = "System Design")]
    SystemDesign,
}

/// Parameters the questions are generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewForm {
    pub job_role: String,
    pub company: String,
    pub difficulty: Difficulty,
    pub interview_type: InterviewType,
    pub rounds: u8,
}

#[derive(Serialize)]
struct SetupRequest<'a> {
    #[serde(flatten)]
    form: &'a InterviewForm,
    page: u32,
}

#[derive(Deserialize)]
struct SetupResponse {
    questions: Vec<String>,
}

/// Pages through the questions generated for one form.
///
/// Each page is fetched at most once; going back never hits the network.
pub struct QuestionPager<'a> {
    gateway: &'a Gateway,
    form: InterviewForm,
    pages: BTreeMap<u32, Vec<String>>,
    current: u32,
}

impl<'a> QuestionPager<'a> {
    pub fn new(gateway: &'a Gateway, form: InterviewForm) -> Self {
        Self {
            gateway,
            form,
            pages: BTreeMap::new(),
            current: 1,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current
    }

    /// Questions on the current page; empty until that page has loaded.
    pub fn questions(&self) -> &[String] {
        self.pages
            .get(&self.current)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Questions on the current page with their overall number.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        let offset = (self.current as usize - 1) * QUESTIONS_PER_PAGE;
        self.questions()
            .iter()
            .enumerate()
            .map(move |(idx, q)| (offset + idx + 1, q.as_str()))
    }

    /// Drop every cached page and load the first one again.
    pub async fn submit(&mut self) -> Result<&[String], GatewayError> {
        self.pages.clear();
        self.current = 1;
        self.load(1).await?;
        Ok(self.questions())
    }

    /// Advance one page, fetching it if it is not cached yet.
    pub async fn next(&mut self) -> Result<&[String], GatewayError> {
        self.current += 1;
        self.load(self.current).await?;
        Ok(self.questions())
    }

    /// Go back one page; stays on page 1.
    pub fn prev(&mut self) -> &[String] {
        if self.current > 1 {
            self.current -= 1;
        }
        self.questions()
    }

    async fn load(&mut self, page: u32) -> Result<(), GatewayError> {
        if self.pages.contains_key(&page) {
            return Ok(());
        }

        let body = SetupRequest {
            form: &self.form,
            page,
        };
        let resp: SetupResponse = self.gateway.post_json("/interview/setup/", &body).await?;
        debug!(page, count = resp.questions.len(), "Loaded interview questions");

        self.pages.insert(page, resp.questions);
        Ok(())
    }
}

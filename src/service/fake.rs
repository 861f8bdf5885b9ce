//! Scripted in-process service for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::color::science::HexColor;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{Generation, PaletteService, SingleColorRequest};

/// One recorded call.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Generate(String),
    Refine(Vec<HexColor>, String),
    Single(SingleColorRequest),
}

/// Pops queued results in order and records every call.
#[derive(Default)]
pub(crate) struct ScriptedService {
    results: Mutex<VecDeque<ServiceResult<Generation>>>,
    calls: Mutex<Vec<Call>>,
    unhealthy: AtomicBool,
}

impl ScriptedService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_palette(&self, colors: &[&str], timestamp: i64, advice: &str) {
        let generation = Generation {
            colors: palette(colors),
            timestamp,
            advice: advice.to_string(),
            description: String::new(),
        };
        self.results.lock().unwrap().push_back(Ok(generation));
    }

    pub(crate) fn push_failure(&self, message: &str) {
        self.results
            .lock()
            .unwrap()
            .push_back(Err(ServiceError::Unavailable(message.to_string())));
    }

    pub(crate) fn set_unhealthy(&self) {
        self.unhealthy.store(true, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, call: Call) -> ServiceResult<Generation> {
        self.calls.lock().unwrap().push(call);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Unavailable("nothing scripted".to_string())))
    }
}

#[async_trait]
impl PaletteService for ScriptedService {
    async fn generate(&self, prompt: &str) -> ServiceResult<Generation> {
        self.next(Call::Generate(prompt.to_string()))
    }

    async fn refine(&self, current: &[HexColor], prompt: &str) -> ServiceResult<Generation> {
        self.next(Call::Refine(current.to_vec(), prompt.to_string()))
    }

    async fn regenerate_one(&self, request: &SingleColorRequest) -> ServiceResult<Generation> {
        self.next(Call::Single(request.clone()))
    }

    async fn health_check(&self) -> ServiceResult<()> {
        if self.unhealthy.load(Ordering::SeqCst) {
            Err(ServiceError::Unavailable("down".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Parse a list of hex literals.
pub(crate) fn palette(colors: &[&str]) -> Vec<HexColor> {
    colors.iter().map(|c| HexColor::parse(c).unwrap()).collect()
}

/// Five distinct colors.
pub(crate) const WARM: [&str; 5] = ["#FF5733", "#FFBD33", "#DBFF33", "#75FF33", "#33FF57"];
/// Five other distinct colors.
pub(crate) const COOL: [&str; 5] = ["#3357FF", "#33A8FF", "#33FFF0", "#8D33FF", "#2E2E8A"];
/// Five more.
pub(crate) const MUTED: [&str; 5] = ["#6B705C", "#A5A58D", "#B7B7A4", "#FFE8D6", "#DDBEA9"];

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use crate::config::DesignConfig;
use crate::engine::{DesignReport, SearchOutcome, design_primer_pairs};
use crate::error::DesignError;
use crate::sequence::Template;

/// Cooperative cancellation flag shared between a search and its owner.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once cancelled, for `?` at loop heads.
    pub(crate) fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Marker for a search that stopped because its token was cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cancelled;

/// Runs at most one search at a time: submitting a new one cancels the
/// previous search, whose receiver then yields nothing.
#[derive(Default)]
pub struct DesignSession {
    latest: Option<CancellationToken>,
}

impl DesignSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(
        &mut self,
        template: Template,
        config: DesignConfig,
    ) -> Receiver<Result<DesignReport, DesignError>> {
        self.cancel();
        let token = CancellationToken::new();
        self.latest = Some(token.clone());

        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || match design_primer_pairs(&template, &config, &token) {
            Ok(SearchOutcome::Completed(report)) => {
                // the caller may have stopped listening
                let _ = sender.send(Ok(report));
            }
            Ok(SearchOutcome::Cancelled) => {
                log::debug!("search superseded, discarding partial work");
            }
            Err(e) => {
                let _ = sender.send(Err(e));
            }
        });
        receiver
    }

    /// Cancels the in-flight search, if any.
    pub fn cancel(&mut self) {
        if let Some(previous) = self.latest.take() {
            previous.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        assert_eq!(clone.check(), Ok(()));
        token.cancel();
        assert!(clone.is_cancelled());
        assert_eq!(clone.check(), Err(Cancelled));
    }

    #[test]
    fn test_session_delivers_result() {
        let template =
            Template::new(&"ACGTGCTAGCATCGATCGGCTAGCTAGGATCCGATCGTAGC".repeat(3)).unwrap();
        let config = DesignConfig {
            min_product: 40,
            max_product: 120,
            target_product: 80,
            ..DesignConfig::default()
        };
        let mut session = DesignSession::new();
        let receiver = session.submit(template, config);
        let result = receiver.recv().expect("search should complete");
        assert!(result.is_ok());
    }

    #[test]
    fn test_session_reports_validation_errors() {
        let template = Template::new("ACGT").unwrap();
        let mut session = DesignSession::new();
        let receiver = session.submit(template, DesignConfig::default());
        let result = receiver.recv().expect("validation error should be delivered");
        assert!(matches!(result, Err(DesignError::TemplateTooShort { .. })));
    }

    fn long_template(length: usize) -> Template {
        let mut state: u32 = 0x2545_f491;
        let bases: String = (0..length)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                ['A', 'C', 'G', 'T'][(state >> 30) as usize]
            })
            .collect();
        Template::new(&bases).unwrap()
    }

    #[test]
    fn test_superseded_search_delivers_nothing() {
        let mut session = DesignSession::new();
        let first = session.submit(long_template(20_000), DesignConfig::default());
        let second = session.submit(long_template(400), DesignConfig::default());
        assert!(matches!(first.recv(), Err(mpsc::RecvError)));
        assert!(second.recv().expect("latest search should complete").is_ok());
    }

    #[test]
    fn test_superseded_token_is_cancelled() {
        let mut session = DesignSession::new();
        let template = Template::new(&"ACGT".repeat(10)).unwrap();
        let _first = session.submit(template.clone(), DesignConfig::default());
        let first_token = session.latest.clone().unwrap();
        let _second = session.submit(template, DesignConfig::default());
        assert!(first_token.is_cancelled());
        assert!(!session.latest.as_ref().unwrap().is_cancelled());
    }
}

//! Enablement voter
//!
//! Collects votes and performs the ownership exchange with the companion
//! when the effective enable value flips.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Timer;
use quickpeek_protocol::{Register, HANDOVER, TAKEBACK};

use super::{Coordinator, DeviceMode};
use crate::config::CoordinatorConfig;
use crate::state::{Exchange, VoterId};
use crate::traits::{CompanionLink, QuickDraw, TransportError, WakeLock};

/// Why an ownership exchange did not complete cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExchangeError {
    Transport(TransportError),
    /// Companion stayed busy for the whole poll budget
    BusyTimeout,
}

impl From<TransportError> for ExchangeError {
    fn from(e: TransportError) -> Self {
        ExchangeError::Transport(e)
    }
}

/// Give peek framing to the host
pub async fn hand_over<L: CompanionLink>(link: &mut L) -> Result<(), ExchangeError> {
    link.write(Register::PeekStatus, &[HANDOVER]).await?;
    Ok(())
}

/// Reclaim the panel and wait for the companion to go quiet
///
/// Polls the busy register up to `takeback_max_polls` times.
pub async fn take_back<L: CompanionLink>(
    link: &mut L,
    config: &CoordinatorConfig,
) -> Result<(), ExchangeError> {
    link.write(Register::PeekStatus, &[TAKEBACK]).await?;

    let mut busy = [0u8; 1];
    for poll in 0..config.takeback_max_polls {
        link.read(Register::CompanionBusy, &mut busy).await?;
        if busy[0] == 0 {
            trace!("Companion idle after {} poll(s)", poll + 1);
            return Ok(());
        }
        Timer::after_millis(config.takeback_poll_interval_ms as u64).await;
    }

    Err(ExchangeError::BusyTimeout)
}

impl<M, L, P, W> Coordinator<M, L, P, W>
where
    M: RawMutex,
    L: CompanionLink,
    P: QuickDraw,
    W: WakeLock,
{
    /// Record a vote; call [`resolve`](Self::resolve) to apply it
    pub fn vote(&self, voter: VoterId, enable: bool) {
        self.votes.lock(|v| v.borrow_mut().vote(voter, enable));
        trace!("Vote {:?} = {}", voter, enable);
    }

    /// Current vote mask
    pub fn vote_mask(&self) -> u8 {
        self.votes.lock(|v| v.borrow().vote_mask())
    }

    /// Apply pending votes
    ///
    /// Performs a handover or takeback only when the effective value
    /// changed since the last exchange, and returns which one ran. Outside
    /// [`DeviceMode::Normal`] the exchange stays pending, though a pending
    /// takeback still stops ingestion.
    pub async fn resolve(&self) -> Option<Exchange> {
        // The queue lock is never taken under the device lock
        if self.votes.lock(|v| v.borrow().pending()) == Some(Exchange::Takeback) {
            self.with_state(|s| s.enabled = false);
        }

        let exchange = {
            let mut device = self.device.lock().await;
            if device.mode != DeviceMode::Normal {
                debug!("Exchange deferred in {:?} mode", device.mode);
                return None;
            }

            let exchange = self.votes.lock(|v| v.borrow_mut().resolve())?;
            match exchange {
                Exchange::Handover => {
                    if let Err(e) = hand_over(&mut device.link).await {
                        warn!("Handover failed: {:?}", e);
                    }
                }
                Exchange::Takeback => {
                    match take_back(&mut device.link, &self.config).await {
                        Ok(()) => {}
                        Err(ExchangeError::BusyTimeout) => {
                            error!(
                                "Companion still busy after {} ms, continuing takeback",
                                self.config.takeback_budget_ms()
                            );
                        }
                        Err(e) => warn!("Takeback failed: {:?}", e),
                    }
                }
            }
            exchange
        };

        match exchange {
            Exchange::Handover => {
                self.with_state(|s| s.enabled = true);
                info!("Quick-peek enabled");
            }
            Exchange::Takeback => {
                self.with_state(|s| s.enabled = false);
                info!("Quick-peek disabled");
                self.reset().await;
            }
        }
        Some(exchange)
    }
}

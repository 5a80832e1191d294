use campaign_core::{Effect, NoticeLevel, Notification};
use engine_logging::{active_campaign, engine_error, engine_info};

/// Shows notifications to the user. Injected so the reducer never reaches
/// for a global notification facility.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Prints notifications to stderr.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) {
        let prefix = match notification.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{prefix}] {}", notification.message);
    }
}

/// What the app loop should do after a batch of effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Control {
    pub stop_stream: bool,
}

pub struct EffectRunner<N: Notifier> {
    notifier: N,
}

impl<N: Notifier> EffectRunner<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }

    pub fn run(&self, effects: Vec<Effect>) -> Control {
        let mut control = Control::default();
        for effect in effects {
            match effect {
                Effect::Notify(notification) => {
                    match notification.level {
                        NoticeLevel::Error => engine_error!(
                            "campaign={} {}",
                            active_campaign(),
                            notification.message
                        ),
                        NoticeLevel::Info => engine_info!(
                            "campaign={} {}",
                            active_campaign(),
                            notification.message
                        ),
                    }
                    self.notifier.notify(&notification);
                }
                Effect::QueryFinished { campaign_id } => {
                    engine_info!("Campaign {} finished; closing stream", campaign_id);
                    control.stop_stream = true;
                }
            }
        }
        control
    }
}

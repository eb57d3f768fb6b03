//! Broadcast channel for form events.

use registry_types::FormEvent;
use tokio::sync::broadcast;

/// Fan-out of [`FormEvent`]s to every subscriber.
///
/// Publishing with no subscribers is not an error worth reporting; callers
/// discard the result.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<FormEvent>,
}

impl EventBus {
	/// Creates a bus that buffers up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Subscribes to events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
		self.sender.subscribe()
	}

	/// Sends an event to every subscriber. Fails when nobody is listening.
	pub fn publish(
		&self,
		event: FormEvent,
	) -> Result<(), broadcast::error::SendError<FormEvent>> {
		self.sender.send(event)?;
		Ok(())
	}
}

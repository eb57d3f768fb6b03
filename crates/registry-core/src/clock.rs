//! Wall clock shown in the warehouse logs.

use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default refresh period of the displayed clock.
pub const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// One clock reading.
#[derive(Debug, Clone, Copy)]
pub struct ClockReading {
	pub now: DateTime<Local>,
	/// Number of ticks since the clock started.
	pub ticks: u64,
}

impl ClockReading {
	/// Date as `dd/mm/yyyy`.
	pub fn date(&self) -> String {
		self.now.format("%d/%m/%Y").to_string()
	}

	/// Time as `HH:MM:SS`.
	pub fn time(&self) -> String {
		self.now.format("%H:%M:%S").to_string()
	}
}

/// Periodic clock publishing readings on a watch channel.
///
/// The last reading stays readable after [`Clock::stop`].
pub struct Clock {
	receiver: watch::Receiver<ClockReading>,
	handle: JoinHandle<()>,
}

impl Clock {
	/// Starts ticking. The first tick fires immediately.
	pub fn start(period: Duration) -> Self {
		let (sender, receiver) = watch::channel(ClockReading {
			now: Local::now(),
			ticks: 0,
		});

		let handle = tokio::spawn(async move {
			let mut interval = tokio::time::interval(period);
			let mut ticks = 0u64;
			loop {
				interval.tick().await;
				ticks += 1;
				if sender
					.send(ClockReading {
						now: Local::now(),
						ticks,
					})
					.is_err()
				{
					break;
				}
			}
		});

		Self { receiver, handle }
	}

	/// Latest reading, frozen once the clock is stopped.
	pub fn reading(&self) -> ClockReading {
		*self.receiver.borrow()
	}

	/// Stops ticking without discarding the last reading.
	pub fn stop(&self) {
		self.handle.abort();
	}

	/// Whether the ticking task is still alive.
	pub fn is_running(&self) -> bool {
		!self.handle.is_finished()
	}
}

impl Drop for Clock {
	fn drop(&mut self) {
		self.handle.abort();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn test_ticks_every_period() {
		let clock = Clock::start(CLOCK_PERIOD);

		tokio::time::sleep(Duration::from_millis(3_500)).await;
		assert!(clock.reading().ticks >= 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_stop_freezes_reading() {
		let clock = Clock::start(CLOCK_PERIOD);
		tokio::time::sleep(Duration::from_millis(1_500)).await;

		clock.stop();
		tokio::task::yield_now().await;
		let frozen = clock.reading().ticks;

		tokio::time::sleep(Duration::from_secs(5)).await;
		assert_eq!(clock.reading().ticks, frozen);
		assert!(!clock.is_running());
	}

	#[test]
	fn test_reading_formats() {
		let reading = ClockReading {
			now: Local::now(),
			ticks: 0,
		};
		assert_eq!(reading.date().len(), 10);
		assert_eq!(reading.time().len(), 8);
	}
}

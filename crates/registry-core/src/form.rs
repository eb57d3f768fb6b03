//! The lot registration form.
//!
//! An [`OrderForm`] owns one operator session: the values being typed, the
//! warehouse location read at mount, the wallet and ledger binding, and the
//! outcome of the last registration. Background initialization runs in
//! spawned tasks that the form aborts when it is unmounted.

use crate::clock::{Clock, CLOCK_PERIOD};
use crate::diagnostics::DiagnosticProbe;
use crate::event_bus::EventBus;
use crate::FormError;
use registry_ledger::LedgerService;
use registry_location::LocationInterface;
use registry_qr::QrEncoder;
use registry_types::{
	FormEvent, FormView, GeoReading, LotField, LotForm, LotRequest, QrArtifact, Readiness,
	SensorReadings, SubmissionResult, WalletSession, WarehouseLogs, SUCCESS_BANNER,
};
use registry_wallet::WalletService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{instrument, Instrument};

/// Static settings of a form, taken from configuration.
#[derive(Debug, Clone)]
pub struct FormSettings {
	/// Registry instance the form belongs to, used in log context.
	pub registry_id: String,
	/// Chain the ledger node must report.
	pub chain_id: u64,
	/// Sensor values attached to every lot.
	pub sensors: SensorReadings,
}

impl From<&registry_config::Config> for FormSettings {
	fn from(config: &registry_config::Config) -> Self {
		Self {
			registry_id: config.registry.id.clone(),
			chain_id: config.ledger.chain_id,
			sensors: config.sensors,
		}
	}
}

#[derive(Default)]
struct FormState {
	form: LotForm,
	geo: GeoReading,
	session: Option<WalletSession>,
	result: Option<SubmissionResult>,
	qr: Option<QrArtifact>,
	error: Option<String>,
}

/// Clears the in-flight flag when a submission ends, however it ends.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
	fn claim(flag: &Arc<AtomicBool>) -> Option<Self> {
		flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.ok()
			.map(|_| Self(Arc::clone(flag)))
	}
}

impl Drop for InFlight {
	fn drop(&mut self) {
		self.0.store(false, Ordering::Release);
	}
}

/// Lot registration form bound to a wallet, a ledger and a location source.
pub struct OrderForm {
	settings: FormSettings,
	wallet: Arc<WalletService>,
	ledger: Arc<LedgerService>,
	location: Arc<dyn LocationInterface>,
	qr: Arc<dyn QrEncoder>,
	diagnostics: Option<DiagnosticProbe>,
	event_bus: EventBus,
	state: RwLock<FormState>,
	readiness: watch::Sender<Readiness>,
	in_flight: Arc<AtomicBool>,
	mounted: AtomicBool,
	unmounted: AtomicBool,
	tasks: Mutex<Vec<JoinHandle<()>>>,
	clock: Mutex<Option<Clock>>,
}

impl OrderForm {
	/// Creates an unmounted form around its collaborators.
	///
	/// Nothing runs until [`OrderForm::mount`] is called.
	pub fn new(
		settings: FormSettings,
		wallet: Arc<WalletService>,
		ledger: Arc<LedgerService>,
		location: Arc<dyn LocationInterface>,
		qr: Arc<dyn QrEncoder>,
		diagnostics: Option<DiagnosticProbe>,
		event_bus: EventBus,
	) -> Self {
		let (readiness, _) = watch::channel(Readiness::Idle);
		Self {
			settings,
			wallet,
			ledger,
			location,
			qr,
			diagnostics,
			event_bus,
			state: RwLock::new(FormState::default()),
			readiness,
			in_flight: Arc::new(AtomicBool::new(false)),
			mounted: AtomicBool::new(false),
			unmounted: AtomicBool::new(false),
			tasks: Mutex::new(Vec::new()),
			clock: Mutex::new(None),
		}
	}

	/// Bus on which the form publishes every observable state change.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Whether a diagnostic probe fires at mount.
	pub fn has_diagnostics(&self) -> bool {
		self.diagnostics.is_some()
	}

	/// Current state of the wallet and ledger binding.
	pub fn readiness(&self) -> Readiness {
		self.readiness.borrow().clone()
	}

	/// Overwrites one field. No validation is applied.
	pub async fn on_field_change(&self, field: LotField, value: impl Into<String>) {
		let value = value.into();
		self.state.write().await.form.set(field, value.clone());
		self.event_bus
			.publish(FormEvent::FieldChanged { field, value })
			.ok();
	}

	/// Starts background initialization. A second call does nothing, and
	/// neither does a call after [`OrderForm::unmount`].
	///
	/// Location, the diagnostic probe, the wallet binding and the clock start
	/// independently; none waits for another.
	pub async fn mount(self: &Arc<Self>) {
		if !self.is_live() {
			tracing::debug!(registry = %self.settings.registry_id, "Form already unmounted");
			return;
		}
		if self
			.mounted
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.is_err()
		{
			tracing::debug!(registry = %self.settings.registry_id, "Form already mounted");
			return;
		}

		self.readiness.send_replace(Readiness::Loading);
		self.event_bus.publish(FormEvent::Mounted).ok();
		tracing::info!(registry = %self.settings.registry_id, "Mounted order form");

		let mut tasks = self.tasks.lock().await;

		let form = Arc::clone(self);
		tasks.push(tokio::spawn(async move { form.acquire_location().await }));

		if let Some(probe) = self.diagnostics.clone() {
			tasks.push(tokio::spawn(async move { probe.fire().await }));
		}

		let form = Arc::clone(self);
		tasks.push(tokio::spawn(async move { form.bind_session().await }));

		*self.clock.lock().await = Some(Clock::start(CLOCK_PERIOD));
	}

	/// Stops the clock and aborts initialization still in progress.
	///
	/// A binding still loading settles as failed. A submission already sent
	/// to the ledger is not aborted.
	pub async fn unmount(&self) {
		self.unmounted.store(true, Ordering::Release);

		for handle in self.tasks.lock().await.drain(..) {
			handle.abort();
		}
		if let Some(clock) = self.clock.lock().await.as_ref() {
			if clock.is_running() {
				clock.stop();
				tracing::debug!(ticks = clock.reading().ticks, "Stopped clock");
			}
		}
		self.readiness.send_if_modified(|state| {
			if *state != Readiness::Loading {
				return false;
			}
			*state = Readiness::Failed("Form unmounted".to_string());
			true
		});

		self.event_bus.publish(FormEvent::Unmounted).ok();
		tracing::info!(registry = %self.settings.registry_id, "Unmounted order form");
	}

	fn is_live(&self) -> bool {
		!self.unmounted.load(Ordering::Acquire)
	}

	async fn acquire_location(&self) {
		match self.location.current_position().await {
			Ok(reading) => {
				if !self.is_live() {
					return;
				}
				tracing::info!(
					latitude = %reading.latitude,
					longitude = %reading.longitude,
					"Acquired warehouse location"
				);
				self.event_bus
					.publish(FormEvent::LocationAcquired {
						latitude: reading.latitude.clone(),
						longitude: reading.longitude.clone(),
					})
					.ok();
				self.state.write().await.geo = reading;
			},
			Err(e) => {
				tracing::warn!(error = %e, "Failed to read location");
			},
		}
	}

	async fn bind_session(&self) {
		let outcome = self.resolve_session().await;
		if !self.is_live() {
			return;
		}

		match outcome {
			Ok(session) => {
				tracing::info!(
					account = %session.display_account(),
					chain_id = session.chain_id,
					contract = %session.contract,
					"Wallet bound"
				);
				self.event_bus
					.publish(FormEvent::SessionReady {
						account: session.display_account(),
						chain_id: session.chain_id,
					})
					.ok();
				self.state.write().await.session = Some(session);
				self.readiness.send_replace(Readiness::Ready);
			},
			Err(e) => {
				let reason = e.to_string();
				tracing::error!(error = %reason, "Wallet binding failed");
				self.event_bus
					.publish(FormEvent::SessionFailed {
						reason: reason.clone(),
					})
					.ok();
				self.readiness.send_replace(Readiness::Failed(reason));
			},
		}
	}

	async fn resolve_session(&self) -> Result<WalletSession, FormError> {
		let account = self.wallet.primary_account().await?;
		let chain_id = self.ledger.chain_id().await?;
		if chain_id != self.settings.chain_id {
			return Err(FormError::ChainMismatch {
				expected: self.settings.chain_id,
				actual: chain_id,
			});
		}

		Ok(WalletSession {
			account,
			chain_id,
			contract: self.ledger.contract(),
		})
	}

	/// Waits until the binding has either succeeded or failed. Unmounting
	/// during binding settles it as failed.
	///
	/// Returns immediately with `Idle` if the form was never mounted.
	pub async fn wait_ready(&self) -> Readiness {
		let mut receiver = self.readiness.subscribe();
		let settled = match receiver
			.wait_for(|state| state.is_settled() || *state == Readiness::Idle)
			.await
		{
			Ok(state) => state.clone(),
			Err(_) => self.readiness(),
		};
		settled
	}

	/// Registers the current form values as a lot.
	///
	/// On success the lot's QR code is rendered; a rendering failure is
	/// logged and does not fail the submission.
	///
	/// Once the in-flight flag is claimed the ledger write, the result
	/// update and QR rendering run in their own task. Dropping the returned
	/// future does not cancel them, and the flag stays claimed until they
	/// finish.
	#[instrument(skip_all, fields(registry = %self.settings.registry_id))]
	pub async fn submit(self: &Arc<Self>) -> Result<SubmissionResult, FormError> {
		let readiness = self.readiness();
		if !readiness.is_ready() {
			let err = FormError::NotReady(readiness);
			self.state.write().await.error = Some(err.to_string());
			return Err(err);
		}

		let Some(in_flight) = InFlight::claim(&self.in_flight) else {
			tracing::debug!("Rejected submission while another is in flight");
			return Err(FormError::SubmissionInFlight);
		};

		let form = Arc::clone(self);
		let submission = tokio::spawn(
			async move {
				let _in_flight = in_flight;
				form.run_submission().await
			}
			.in_current_span(),
		);

		match submission.await {
			Ok(outcome) => outcome,
			Err(e) => {
				tracing::error!(error = %e, "Submission task failed");
				Err(FormError::SubmissionTask(e.to_string()))
			},
		}
	}

	async fn run_submission(&self) -> Result<SubmissionResult, FormError> {
		self.event_bus.publish(FormEvent::SubmissionStarted).ok();

		let request = {
			let state = self.state.read().await;
			LotRequest::new(&state.form, &state.geo, self.settings.sensors)
		};
		tracing::info!(grain_type = %request.grain_type, weight = %request.weight, "Submitting lot");

		let result = match self.ledger.register_lot(&request).await {
			Ok(result) => result,
			Err(e) => {
				let err = FormError::Ledger(e);
				tracing::error!(error = %err, "Lot registration failed");
				self.state.write().await.error = Some(err.to_string());
				self.event_bus
					.publish(FormEvent::SubmissionFailed {
						error: err.to_string(),
					})
					.ok();
				return Err(err);
			},
		};

		{
			let mut state = self.state.write().await;
			state.result = Some(result.clone());
			state.error = None;
		}
		self.event_bus
			.publish(FormEvent::LotRegistered(result.clone()))
			.ok();

		self.render_qr(&result.lot_id).await;
		Ok(result)
	}

	/// Encodes a lot id as QR unless it is already the rendered payload.
	async fn render_qr(&self, lot_id: &str) {
		let current = self.state.read().await.qr.as_ref().map(|qr| qr.payload.clone());
		if current.as_deref() == Some(lot_id) {
			return;
		}

		match self.qr.encode(lot_id) {
			Ok(artifact) => {
				self.state.write().await.qr = Some(artifact);
				self.event_bus
					.publish(FormEvent::QrRendered {
						lot_id: lot_id.to_string(),
					})
					.ok();
			},
			Err(e) => {
				tracing::warn!(lot_id, error = %e, "Failed to render QR code");
				self.event_bus
					.publish(FormEvent::QrFailed {
						lot_id: lot_id.to_string(),
						error: e.to_string(),
					})
					.ok();
			},
		}
	}

	/// Snapshot of everything the operator sees.
	pub async fn view(&self) -> FormView {
		let clock = self.clock.lock().await.as_ref().map(Clock::reading);
		let state = self.state.read().await;

		let logs = WarehouseLogs {
			latitude: state.geo.latitude.clone(),
			longitude: state.geo.longitude.clone(),
			date: clock.map(|c| c.date()).unwrap_or_default(),
			time: clock.map(|c| c.time()).unwrap_or_default(),
			temperature: self.settings.sensors.temperature.to_string(),
			humidity: self.settings.sensors.humidity.to_string(),
			user: state.session.as_ref().map(WalletSession::display_account),
		};

		FormView {
			form: state.form.clone(),
			logs,
			readiness: self.readiness(),
			submitting: self.in_flight.load(Ordering::Acquire),
			result: state.result.clone(),
			banner: state.qr.as_ref().map(|_| SUCCESS_BANNER.to_string()),
			qr: state.qr.clone(),
			error: state.error.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::*;
	use registry_ledger::LedgerError;
	use std::time::Duration;

	#[tokio::test]
	async fn test_field_change_overwrites_only_that_field() {
		let harness = Harness::new();
		let form = harness.form();

		form.on_field_change(LotField::GrainType, "Wheat").await;
		form.on_field_change(LotField::Weight, "120").await;
		form.on_field_change(LotField::GrainType, "Rice").await;

		let view = form.view().await;
		assert_eq!(view.form.grain_type, "Rice");
		assert_eq!(view.form.weight_kg, "120");
		assert_eq!(view.form.description, "");
		assert_eq!(view.form.declared_temperature, "1");
		assert_eq!(view.form.declared_humidity, "1");
	}

	#[tokio::test]
	async fn test_field_change_publishes_event() {
		let harness = Harness::new();
		let form = harness.form();
		let mut events = form.event_bus().subscribe();

		form.on_field_change(LotField::Description, "Dry").await;

		match events.recv().await.unwrap() {
			FormEvent::FieldChanged { field, value } => {
				assert_eq!(field, LotField::Description);
				assert_eq!(value, "Dry");
			},
			other => panic!("unexpected event {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_mount_binds_session_and_location() {
		let harness = Harness::new();
		let form = harness.form();

		form.mount().await;
		assert_eq!(form.wait_ready().await, Readiness::Ready);

		// Location is independent of binding; give it a moment
		tokio::time::sleep(Duration::from_millis(20)).await;
		let view = form.view().await;
		assert_eq!(view.logs.latitude, "18.5204");
		assert_eq!(view.logs.longitude, "73.8567");
		assert_eq!(view.logs.user.as_deref(), Some(ACCOUNT_CHECKSUM));
		assert_eq!(view.logs.temperature, "10");
		assert_eq!(view.logs.humidity, "10");
	}

	#[tokio::test]
	async fn test_mount_twice_is_noop() {
		let harness = Harness::new();
		let form = harness.form();
		let mut events = form.event_bus().subscribe();

		form.mount().await;
		form.mount().await;
		form.wait_ready().await;

		let mut mounted = 0;
		while let Ok(event) = events.try_recv() {
			if matches!(event, FormEvent::Mounted) {
				mounted += 1;
			}
		}
		assert_eq!(mounted, 1);
		assert_eq!(harness.ledger.chain_reads(), 1);
	}

	#[tokio::test]
	async fn test_no_accounts_fails_readiness() {
		let harness = Harness::new().without_accounts();
		let form = harness.form();

		form.mount().await;
		let readiness = form.wait_ready().await;
		assert!(matches!(readiness, Readiness::Failed(ref reason) if reason.contains("No accounts")));

		let err = form.submit().await.unwrap_err();
		assert!(matches!(err, FormError::NotReady(_)));
		assert_eq!(harness.ledger.writes(), 0);
	}

	#[tokio::test]
	async fn test_chain_mismatch_fails_readiness() {
		let harness = Harness::new().with_chain_id(1);
		let form = harness.form();

		form.mount().await;
		let readiness = form.wait_ready().await;
		assert!(
			matches!(readiness, Readiness::Failed(ref reason) if reason.contains("expected 31337"))
		);
	}

	#[tokio::test]
	async fn test_location_failure_leaves_reading_empty() {
		let harness = Harness::new().with_failing_location();
		let form = harness.form();

		form.mount().await;
		assert_eq!(form.wait_ready().await, Readiness::Ready);
		tokio::time::sleep(Duration::from_millis(20)).await;

		let view = form.view().await;
		assert_eq!(view.logs.latitude, "");
		assert_eq!(view.logs.longitude, "");
	}

	#[tokio::test]
	async fn test_submit_before_ready_writes_nothing() {
		let harness = Harness::new();
		let form = harness.form();

		let err = form.submit().await.unwrap_err();
		assert!(matches!(err, FormError::NotReady(Readiness::Idle)));
		assert_eq!(harness.ledger.writes(), 0);
		assert!(form.view().await.error.is_some());
	}

	#[tokio::test]
	async fn test_submit_renders_qr_for_second_log_token() {
		let harness = Harness::new();
		let form = harness.form();
		form.mount().await;
		form.wait_ready().await;

		form.on_field_change(LotField::GrainType, "Wheat").await;
		let result = form.submit().await.unwrap();

		assert_eq!(result.lot_id, "42");
		assert_eq!(harness.qr.requests(), vec!["42".to_string()]);

		let view = form.view().await;
		assert_eq!(view.banner.as_deref(), Some(SUCCESS_BANNER));
		assert_eq!(view.qr.unwrap().payload, "42");
		assert_eq!(view.result.unwrap().lot_id, "42");
		assert!(!view.submitting);
		assert!(view.error.is_none());
	}

	#[tokio::test]
	async fn test_submit_sends_form_location_and_sensors() {
		let harness = Harness::new();
		let form = harness.form();
		form.mount().await;
		form.wait_ready().await;
		tokio::time::sleep(Duration::from_millis(20)).await;

		form.on_field_change(LotField::GrainType, "Wheat").await;
		form.on_field_change(LotField::Description, "Durum").await;
		form.on_field_change(LotField::CertificateUrl, "https://c/1").await;
		form.on_field_change(LotField::Weight, "500").await;
		form.submit().await.unwrap();

		let request = harness.ledger.last_request().unwrap();
		assert_eq!(request.grain_type, "Wheat");
		assert_eq!(request.description, "Durum");
		assert_eq!(request.certificate_url, "https://c/1");
		assert_eq!(request.weight, "500");
		assert_eq!(request.latitude, "18.5204");
		assert_eq!(request.temperature, 10);
		assert_eq!(request.humidity, 10);
		assert_eq!(request.status, 0);
	}

	#[tokio::test]
	async fn test_ledger_failure_skips_qr() {
		let harness = Harness::new().with_ledger_error("execution reverted");
		let form = harness.form();
		form.mount().await;
		form.wait_ready().await;

		let err = form.submit().await.unwrap_err();
		assert!(matches!(err, FormError::Ledger(LedgerError::Network(_))));
		assert!(harness.qr.requests().is_empty());

		let view = form.view().await;
		assert!(view.qr.is_none());
		assert!(view.banner.is_none());
		assert!(view.error.unwrap().contains("execution reverted"));
		assert!(!view.submitting);
	}

	#[tokio::test]
	async fn test_missing_mint_event_is_an_error() {
		let harness = Harness::new().without_mint_event();
		let form = harness.form();
		form.mount().await;
		form.wait_ready().await;

		let err = form.submit().await.unwrap_err();
		assert!(matches!(err, FormError::Ledger(LedgerError::MissingEvent(_))));
		assert!(harness.qr.requests().is_empty());
	}

	#[tokio::test]
	async fn test_qr_failure_keeps_result_and_hides_banner() {
		let harness = Harness::new().with_failing_qr();
		let form = harness.form();
		form.mount().await;
		form.wait_ready().await;

		let result = form.submit().await.unwrap();
		assert_eq!(result.lot_id, "42");
		assert_eq!(harness.qr.requests(), vec!["42".to_string()]);

		let view = form.view().await;
		assert!(view.qr.is_none());
		assert!(view.banner.is_none());
		assert!(view.error.is_none());
		assert_eq!(view.result.unwrap().lot_id, "42");
	}

	#[tokio::test(start_paused = true)]
	async fn test_concurrent_submit_writes_once() {
		let harness = Harness::new().with_ledger_delay(Duration::from_secs(2));
		let form = harness.form();
		form.mount().await;
		form.wait_ready().await;

		let (first, second) = tokio::join!(form.submit(), form.submit());

		assert!(first.is_ok());
		assert!(matches!(second, Err(FormError::SubmissionInFlight)));
		assert_eq!(harness.ledger.writes(), 1);
		assert!(!form.view().await.submitting);

		// The flag is released, so a later submit goes through
		form.submit().await.unwrap();
		assert_eq!(harness.ledger.writes(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_clock_runs_until_unmount() {
		let harness = Harness::new();
		let form = harness.form();
		form.mount().await;

		tokio::time::sleep(Duration::from_millis(2_500)).await;
		let ticks = form.clock.lock().await.as_ref().unwrap().reading().ticks;
		assert!(ticks >= 2);
		assert!(!form.view().await.logs.time.is_empty());

		form.unmount().await;
		tokio::task::yield_now().await;
		let frozen = form.clock.lock().await.as_ref().unwrap().reading().ticks;

		tokio::time::sleep(Duration::from_secs(5)).await;
		let after = form.clock.lock().await.as_ref().unwrap().reading().ticks;
		assert_eq!(after, frozen);
	}

	#[tokio::test(start_paused = true)]
	async fn test_unmount_aborts_pending_binding() {
		let harness = Harness::new().with_ledger_delay(Duration::from_secs(10));
		let form = harness.form();
		form.mount().await;

		form.unmount().await;
		tokio::time::sleep(Duration::from_secs(30)).await;

		assert!(matches!(form.readiness(), Readiness::Failed(ref reason) if reason.contains("unmounted")));
		assert!(form.view().await.logs.user.is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn test_wait_ready_returns_after_unmount() {
		let harness = Harness::new().with_ledger_delay(Duration::from_secs(10));
		let form = harness.form();
		form.mount().await;
		assert_eq!(form.readiness(), Readiness::Loading);

		form.unmount().await;
		let readiness = tokio::time::timeout(Duration::from_secs(1), form.wait_ready())
			.await
			.unwrap();
		assert!(matches!(readiness, Readiness::Failed(_)));

		let err = form.submit().await.unwrap_err();
		assert!(matches!(err, FormError::NotReady(Readiness::Failed(_))));
		assert_eq!(harness.ledger.writes(), 0);
	}

	#[tokio::test]
	async fn test_mount_after_unmount_is_noop() {
		let harness = Harness::new();
		let form = harness.form();

		form.unmount().await;
		form.mount().await;

		assert_eq!(form.readiness(), Readiness::Idle);
		assert!(form.clock.lock().await.is_none());
		assert!(form.tasks.lock().await.is_empty());
		tokio::time::sleep(Duration::from_millis(20)).await;
		assert_eq!(harness.ledger.chain_reads(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_dropped_submit_still_completes() {
		let harness = Harness::new().with_ledger_delay(Duration::from_secs(5));
		let form = harness.form();
		form.mount().await;
		assert_eq!(form.wait_ready().await, Readiness::Ready);

		let outcome = tokio::time::timeout(Duration::from_secs(1), form.submit()).await;
		assert!(outcome.is_err());
		assert!(form.view().await.submitting);
		assert!(matches!(
			form.submit().await,
			Err(FormError::SubmissionInFlight)
		));

		tokio::time::sleep(Duration::from_secs(10)).await;
		let view = form.view().await;
		assert_eq!(view.result.unwrap().lot_id, "42");
		assert_eq!(view.qr.unwrap().payload, "42");
		assert!(!view.submitting);
		assert_eq!(harness.ledger.writes(), 1);
	}

	#[tokio::test]
	async fn test_mount_fires_diagnostic_probe() {
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let url = format!("http://{}/ping", listener.local_addr().unwrap());
		let server = tokio::spawn(async move {
			use tokio::io::{AsyncReadExt, AsyncWriteExt};

			let (mut socket, _) = listener.accept().await.unwrap();
			let mut buf = vec![0u8; 1024];
			let n = socket.read(&mut buf).await.unwrap();
			socket
				.write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
				.await
				.unwrap();
			String::from_utf8_lossy(&buf[..n]).to_string()
		});

		let harness = Harness::new().with_diagnostics(url);
		let form = harness.form();
		assert!(form.has_diagnostics());

		form.mount().await;
		let request = tokio::time::timeout(Duration::from_secs(5), server)
			.await
			.unwrap()
			.unwrap();
		assert!(request.starts_with("GET /ping "));
		assert_eq!(form.wait_ready().await, Readiness::Ready);
		assert!(form.view().await.error.is_none());
	}

	#[tokio::test]
	async fn test_unreachable_diagnostic_probe_does_not_affect_binding() {
		let harness = Harness::new().with_diagnostics("http://127.0.0.1:9/ping");
		let form = harness.form();

		form.mount().await;
		assert_eq!(form.wait_ready().await, Readiness::Ready);
		tokio::time::sleep(Duration::from_millis(50)).await;

		let view = form.view().await;
		assert!(view.error.is_none());
		assert_eq!(view.readiness, Readiness::Ready);
	}
}

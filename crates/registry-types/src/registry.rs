//! Registry trait for self-registering implementations.

/// Base trait for implementation registries.
///
/// Each collaborator crate (wallet, ledger, location) exposes one `Registry`
/// struct per implementation so the service can map configuration names to
/// factory functions without hard-coding them.
pub trait ImplementationRegistry {
	/// Name used in configuration, e.g. `local` for `[wallet.implementations.local]`.
	const NAME: &'static str;

	/// Factory function type for this collaborator.
	type Factory;

	/// Returns the factory that builds this implementation from its TOML table.
	fn factory() -> Self::Factory;
}

// self
use crate::_prelude::*;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type Instrumented<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type Instrumented<F> = F;

/// Span wrapping a step execution or an identity refresh.
#[derive(Clone, Debug)]
pub struct ObsSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ObsSpan {
	/// Creates an `auth_gitlab.step` span for `step` of the `pipeline` kind.
	pub fn step(pipeline: &'static str, step: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("auth_gitlab.step", pipeline, step) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (pipeline, step);

			Self {}
		}
	}

	/// Creates an `auth_gitlab.refresh` span for the provider `key`.
	pub fn refresh(provider: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("auth_gitlab.refresh", provider) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = provider;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_passes_output_through() {
		let value = ObsSpan::step("auth", "fetch_user").instrument(async { 42 }).await;

		assert_eq!(value, 42);

		let value = ObsSpan::refresh("gitlab").instrument(async { "ok" }).await;

		assert_eq!(value, "ok");
	}
}

use crate::config::{ConfigAction, RenderConfiguration};
use crate::regenerate::{CompiledProgram, RegenerateError, Regenerator, ShaderBackend};

/// Render configuration plus the program built from it.
///
/// Every configuration change goes through [`ArtSession::apply`], which keeps
/// the live program in step with the configuration.
pub struct ArtSession<B: ShaderBackend> {
    config: RenderConfiguration,
    regenerator: Regenerator<B>,
}

impl<B: ShaderBackend> ArtSession<B> {
    /// Builds the first program for `config`.
    pub fn start(
        config: RenderConfiguration,
        regenerator: Regenerator<B>,
    ) -> Result<Self, RegenerateError> {
        let mut session = Self {
            config,
            regenerator,
        };
        session.regenerate()?;
        Ok(session)
    }

    pub fn config(&self) -> &RenderConfiguration {
        &self.config
    }

    pub fn regenerator(&self) -> &Regenerator<B> {
        &self.regenerator
    }

    pub fn regenerator_mut(&mut self) -> &mut Regenerator<B> {
        &mut self.regenerator
    }

    pub fn program(&self) -> Option<&CompiledProgram<B>> {
        self.regenerator.current()
    }

    /// Discards the live program and builds a fresh one.
    pub fn regenerate(&mut self) -> Result<&CompiledProgram<B>, RegenerateError> {
        self.regenerator.regenerate(&self.config)
    }

    /// Applies one configuration action, regenerating before returning when
    /// the action changed a field. Returns whether regeneration happened.
    pub fn apply(&mut self, action: ConfigAction) -> Result<bool, RegenerateError> {
        if !self.config.apply(action) {
            tracing::debug!(?action, "configuration unchanged; keeping current program");
            return Ok(false);
        }
        tracing::info!(?action, config = %self.config, "configuration changed");
        self.regenerate()?;
        Ok(true)
    }
}

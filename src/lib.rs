pub mod errors;
pub mod measure;
pub mod model;
pub mod output;
pub mod record;
pub mod schema;
pub mod translator;
pub mod validation;
pub mod workspace;

extern crate lazy_static;

pub use crate::errors::IdfKitError;
use crate::errors::OutputError;
pub use crate::model::{Handle, Model, ModelObject};
use crate::output::Output;
pub use crate::record::{FieldValue, Record};
pub use crate::schema::SchemaRegistry;
pub use crate::translator::{Diagnostics, ForwardTranslator, ReverseTranslator};
pub use crate::workspace::Workspace;
use std::any::Any;
use std::io::{Read, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, info};

/// The outcome of reading a workspace, translating it into a model and back again.
#[derive(Debug)]
pub struct RoundTripResults {
    pub model: Model,
    pub workspace: Workspace,
    pub reverse_diagnostics: Diagnostics,
    pub forward_diagnostics: Diagnostics,
}

impl RoundTripResults {
    pub fn error_count(&self) -> usize {
        self.reverse_diagnostics.errors().len() + self.forward_diagnostics.errors().len()
    }
}

/// Reads IDF-style text against the built-in schemas, reverse translates it into a model, forward
/// translates that model back to records and writes them to `output` under `output_key`.
pub fn run_round_trip(
    input: impl Read,
    output: impl Output,
    output_key: &str,
) -> Result<RoundTripResults, IdfKitError> {
    let registry = SchemaRegistry::builtin();
    let workspace = Workspace::from_reader(input, &registry).map_err(anyhow::Error::from)?;
    info!("Read {} records", workspace.len());

    let results = catch_unwind(AssertUnwindSafe(|| {
        let mut reverse = ReverseTranslator::with_registry(registry.clone());
        let model = reverse.translate_workspace(&workspace);
        debug!("Model holds {} objects", model.len());

        let mut forward = ForwardTranslator::new();
        let workspace = forward.translate_model(&model);

        RoundTripResults {
            model,
            workspace,
            reverse_diagnostics: reverse.diagnostics().clone(),
            forward_diagnostics: forward.diagnostics().clone(),
        }
    }))
    .map_err(|panic| IdfKitError::PanicInTranslation(panic_message(panic)))?;

    if !output.is_noop() {
        write_workspace(&output, output_key, &results.workspace)
            .map_err(|e| IdfKitError::ErrorInOutput(OutputError::new(e)))?;
    }

    Ok(results)
}

fn write_workspace(
    output: &impl Output,
    output_key: &str,
    workspace: &Workspace,
) -> anyhow::Result<()> {
    let mut writer = output.writer_for_location_key(output_key)?;
    writeln!(writer, "{}", workspace.to_idf_string())?;
    writer.flush()?;
    Ok(())
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(message) => *message,
        Err(panic) => match panic.downcast::<&str>() {
            Ok(message) => message.to_string(),
            Err(_) => "unknown panic".to_string(),
        },
    }
}

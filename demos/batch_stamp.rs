//! Batch-stamp demo: prepends a stamp line to every text file in a directory
//! and delivers the results as a zip archive on stdout-adjacent storage.
//!
//! Usage: `cargo run --example batch_stamp -- <input_dir> <output_zip>`

use std::fs;
use std::path::PathBuf;

use docmill::{
    create_temporary_buffer, file, for_each_source, BatchParameters, Destination,
    ExecutionContext, ExecutionService, FailurePolicy, MultipleOutputWriter, NameGenerator,
    NameRequest, Result, Source, StreamSink, Task,
};

/// Prepends a one-line stamp to each source text file
struct StampTask {
    stamp: String,
    writer: MultipleOutputWriter,
}

impl StampTask {
    fn new(stamp: impl Into<String>) -> Self {
        Self {
            stamp: stamp.into(),
            writer: MultipleOutputWriter::new(),
        }
    }
}

impl Task<BatchParameters> for StampTask {
    fn before(&mut self, _parameters: &BatchParameters, _context: &ExecutionContext) -> Result<()> {
        self.writer = MultipleOutputWriter::new();
        Ok(())
    }

    fn execute(&mut self, parameters: &BatchParameters, context: &ExecutionContext) -> Result<()> {
        let generator = NameGenerator::new(&parameters.name_template);
        let stamp = self.stamp.clone();
        let writer = &mut self.writer;
        for_each_source(context, &parameters.sources, |step, source| {
            let text = fs::read_to_string(source.path())?;
            let buffer = create_temporary_buffer()?;
            fs::write(&buffer, format!("{stamp}\n{text}"))?;
            let name = generator.generate(
                &NameRequest::with_extension(&parameters.output_extension)
                    .original_name(source.name())
                    .file_number(step),
            );
            writer.add_output(file(buffer).name(name));
            Ok(())
        })?;
        self.writer.flush_outputs(parameters.destination.as_ref())
    }

    fn after(&mut self) {}
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let input_dir = PathBuf::from(args.next().unwrap_or_else(|| "./in".to_string()));
    let output_zip = PathBuf::from(args.next().unwrap_or_else(|| "./stamped.zip".to_string()));

    let archive = fs::File::create(&output_zip)?;
    let mut parameters =
        BatchParameters::new(Destination::stream(StreamSink::new(archive)));
    parameters.name_template = "stamped_[FILENUMBER##]_[BASENAME]".to_string();
    parameters.output_extension = "txt".to_string();
    for entry in fs::read_dir(&input_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "txt") {
            parameters.sources.push(Source::new(path));
        }
    }

    let (context, events) = ExecutionContext::new(FailurePolicy::Lenient);
    let printer = std::thread::spawn(move || {
        for event in events {
            match serde_json::to_string(&event) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("unserializable event: {e}"),
            }
        }
    });

    let outcome = ExecutionService::new().execute(&mut StampTask::new("** stamped by docmill **"), &parameters, &context);
    drop(context);
    printer.join().ok();

    match outcome {
        Ok(()) => {
            println!("archive written to {}", output_zip.display());
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            println!("stopped as requested");
            Ok(())
        }
        Err(e) => {
            eprintln!("failed: {e}");
            let mut cause = std::error::Error::source(&e);
            while let Some(c) = cause {
                eprintln!("  caused by: {c}");
                cause = c.source();
            }
            Err(e.into())
        }
    }
}

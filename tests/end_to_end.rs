//! End-to-end tests driving the public API: a small text-uppercasing task is
//! run through the execution service against each destination shape.

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use docmill::{
    create_temporary_buffer_in, file, for_each_source, BatchParameters, Destination, Error, Event,
    ExecutionContext, ExecutionService, FailurePolicy, MultipleOutputWriter, NameGenerator,
    NameRequest, Result, Source, StreamSink, Task,
};

/// Reads each source as UTF-8 text and writes it back uppercased
struct UppercaseTask {
    writer: MultipleOutputWriter,
    buffer_dir: std::path::PathBuf,
}

impl UppercaseTask {
    fn new(buffer_dir: &Path) -> Self {
        Self {
            writer: MultipleOutputWriter::new(),
            buffer_dir: buffer_dir.to_path_buf(),
        }
    }
}

impl Task<BatchParameters> for UppercaseTask {
    fn before(&mut self, _parameters: &BatchParameters, _context: &ExecutionContext) -> Result<()> {
        self.writer = MultipleOutputWriter::new();
        Ok(())
    }

    fn execute(&mut self, parameters: &BatchParameters, context: &ExecutionContext) -> Result<()> {
        let generator = NameGenerator::new(&parameters.name_template);
        let writer = &mut self.writer;
        let buffer_dir = &self.buffer_dir;
        for_each_source(context, &parameters.sources, |step, source| {
            let text = fs::read_to_string(source.path())?;
            let buffer = create_temporary_buffer_in(buffer_dir)?;
            fs::write(&buffer, text.to_uppercase())?;
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

/// Byte sink the test keeps a handle to after handing it to a destination
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn write_sources(dir: &Path, count: usize) -> Vec<Source> {
    (1..=count)
        .map(|i| {
            let path = dir.join(format!("doc{i}.txt"));
            fs::write(&path, format!("hello {i}")).unwrap();
            Source::new(path)
        })
        .collect()
}

fn drain(events: &crossbeam_channel::Receiver<Event>) -> Vec<Event> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}

#[test]
fn directory_run_materializes_templated_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let mut parameters = BatchParameters::new(Destination::directory(&out));
    parameters.sources = write_sources(dir.path(), 3);
    parameters.name_template = "upper_[FILENUMBER##]_[BASENAME]".to_string();
    parameters.output_extension = "txt".to_string();

    let (context, events) = ExecutionContext::new(FailurePolicy::Strict);
    let mut task = UppercaseTask::new(dir.path());
    ExecutionService::new()
        .execute(&mut task, &parameters, &context)
        .unwrap();

    assert_eq!(
        fs::read_to_string(out.join("upper_01_doc1.txt")).unwrap(),
        "HELLO 1"
    );
    assert_eq!(
        fs::read_to_string(out.join("upper_03_doc3.txt")).unwrap(),
        "HELLO 3"
    );

    // no temp buffers left behind
    let leftovers = walkdir::WalkDir::new(dir.path())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("docmill-"))
        .count();
    assert_eq!(leftovers, 0);

    let events = drain(&events);
    assert_eq!(events[0], Event::Started);
    assert_eq!(
        events[1],
        Event::StepsCompleted {
            completed: 1,
            total: 3
        }
    );
    assert_eq!(
        events[3],
        Event::StepsCompleted {
            completed: 3,
            total: 3
        }
    );
    assert!(matches!(events[4], Event::Completed { .. }));
}

#[test]
fn file_run_delivers_the_single_output() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("result.txt");

    let mut parameters = BatchParameters::new(Destination::file(&target));
    parameters.sources = write_sources(dir.path(), 1);
    parameters.output_extension = "txt".to_string();

    let (context, _events) = ExecutionContext::new(FailurePolicy::Strict);
    let mut task = UppercaseTask::new(dir.path());
    ExecutionService::new()
        .execute(&mut task, &parameters, &context)
        .unwrap();

    assert_eq!(fs::read_to_string(&target).unwrap(), "HELLO 1");
}

#[test]
fn stream_run_archives_every_output() {
    let dir = tempfile::tempdir().unwrap();
    let sink = SharedBuffer::default();

    let mut parameters =
        BatchParameters::new(Destination::stream(StreamSink::new(sink.clone())));
    parameters.sources = write_sources(dir.path(), 2);
    parameters.name_template = "[BASENAME]_[FILENUMBER]".to_string();
    parameters.output_extension = "txt".to_string();

    let (context, _events) = ExecutionContext::new(FailurePolicy::Strict);
    let mut task = UppercaseTask::new(dir.path());
    ExecutionService::new()
        .execute(&mut task, &parameters, &context)
        .unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(sink.contents())).unwrap();
    assert_eq!(archive.len(), 2);
    let mut entry = archive.by_name("doc2_2.txt").unwrap();
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    assert_eq!(content, "HELLO 2");
}

#[test]
fn lenient_run_survives_one_failing_source() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let mut parameters = BatchParameters::new(Destination::directory(&out));
    parameters.sources = write_sources(dir.path(), 3);
    // swap the second source for one that cannot be read
    parameters.sources[1] = Source::new(dir.path().join("missing.txt"));
    parameters.output_extension = "txt".to_string();

    let (context, events) = ExecutionContext::new(FailurePolicy::Lenient);
    let mut task = UppercaseTask::new(dir.path());
    ExecutionService::new()
        .execute(&mut task, &parameters, &context)
        .unwrap();

    let written = fs::read_dir(&out).unwrap().count();
    assert_eq!(written, 2);

    let events = drain(&events);
    let warnings = events
        .iter()
        .filter(|e| matches!(e, Event::Warning { .. }))
        .count();
    assert_eq!(warnings, 1);
    assert!(matches!(events.last(), Some(Event::Completed { .. })));
}

#[test]
fn strict_run_fails_on_the_failing_source_and_names_it() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let mut parameters = BatchParameters::new(Destination::directory(&out));
    parameters.sources = write_sources(dir.path(), 2);
    parameters.sources[0] = Source::with_name(dir.path().join("missing.txt"), "missing.txt");
    parameters.output_extension = "txt".to_string();

    let (context, events) = ExecutionContext::new(FailurePolicy::Strict);
    let mut task = UppercaseTask::new(dir.path());
    let err = ExecutionService::new()
        .execute(&mut task, &parameters, &context)
        .unwrap_err();

    assert!(matches!(err, Error::Execution { ref source_name, .. } if source_name == "missing.txt"));
    assert!(matches!(drain(&events).last(), Some(Event::Failed { .. })));
}

#[test]
fn cancelled_run_reports_cancellation_not_failure() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let mut parameters = BatchParameters::new(Destination::directory(&out));
    parameters.sources = write_sources(dir.path(), 2);
    parameters.output_extension = "txt".to_string();

    let (context, events) = ExecutionContext::new(FailurePolicy::Strict);
    context.cancellation_token().cancel();
    let mut task = UppercaseTask::new(dir.path());
    let err = ExecutionService::new()
        .execute(&mut task, &parameters, &context)
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(!out.exists());

    let events = drain(&events);
    assert_eq!(events, vec![Event::Started, Event::Cancelled]);
}

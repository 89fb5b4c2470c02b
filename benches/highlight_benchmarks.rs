//! Benchmarks for classification and incremental highlighting.
//!
//! Run with: cargo bench

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qwerty_buffer::{Position, TextBuffer};
use qwerty_syntax::{HighlightDriver, LanguageRegistry, LineClassifier, PYTHON, Theme};

/// Generates a Python module with a mix of every category.
fn generate_module(functions: usize) -> String {
    (0..functions)
        .map(|i| {
            format!(
                "def handler_{i}(self, value=0x{i:x}):\n    \
                 # normalize input\n    \
                 result = len(str(value)) + {i}\n    \
                 print('handled', result)\n    \
                 return self.finish(result)\n"
            )
        })
        .collect()
}

fn driver() -> HighlightDriver {
    HighlightDriver::new(Arc::new(LanguageRegistry::with_defaults()), Theme::one_dark())
}

/// Benchmarks single-line classification.
fn bench_classify_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_line");
    let classifier = LineClassifier::new(PYTHON).unwrap();

    let lines = [
        ("comment", "    # a comment that wins over everything = call()"),
        ("definition", "def handler(self, value=0x1f):"),
        ("mixed", "    result = len(str(value)) + 42 if self.ready else None"),
        ("strings", "print('a = b', \"c(d)\", '''e''', value)"),
    ];

    for (name, line) in lines {
        group.bench_with_input(BenchmarkId::from_parameter(name), line, |b, line| {
            b.iter(|| black_box(classifier.classify(black_box(line))))
        });
    }

    group.finish();
}

/// Benchmarks eager highlighting on open.
fn bench_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("open");

    for functions in [100, 1000, 5000] {
        let buffer = TextBuffer::from(generate_module(functions));
        group.bench_with_input(
            BenchmarkId::new("highlight_document", buffer.len_lines()),
            &buffer,
            |b, buffer| {
                b.iter(|| {
                    let mut driver = driver();
                    driver.on_file_opened(Some("py"), buffer);
                    black_box(driver)
                })
            },
        );
    }

    group.finish();
}

/// Benchmarks the per-edit cost on a large document.
fn bench_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental");
    let text = generate_module(5000);

    group.bench_function("edit_in_place", |b| {
        b.iter_with_setup(
            || {
                let buffer = TextBuffer::from(text.as_str());
                let mut driver = driver();
                driver.on_file_opened(Some("py"), &buffer);
                (buffer, driver)
            },
            |(mut buffer, mut driver)| {
                buffer.set_line(12_500, "    value = compute(self)").unwrap();
                driver.on_block_changed(12_500, &buffer);
                black_box(driver)
            },
        )
    });

    group.bench_function("insert_lines", |b| {
        b.iter_with_setup(
            || {
                let buffer = TextBuffer::from(text.as_str());
                let mut driver = driver();
                driver.on_file_opened(Some("py"), &buffer);
                (buffer, driver)
            },
            |(mut buffer, mut driver)| {
                let delta = buffer
                    .insert_at(Position::new(12_500, 0), "x = 1\ny = 2\n")
                    .unwrap();
                driver.on_lines_replaced(delta, &buffer);
                black_box(driver)
            },
        )
    });

    group.finish();
}

criterion_group!(benches, bench_classify_line, bench_open, bench_incremental);
criterion_main!(benches);

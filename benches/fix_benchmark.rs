//! Benchmarks for reqdot detection and repair.
//!
//! Run with: cargo bench
//!
//! Packages are synthesized with a growing number of paragraphs, half of
//! them pointing at styles the styles part never declares.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reqdot::content_types::DocumentKind;
use reqdot::fixer::{Detector, Rewriter};
use reqdot::OoxmlContainer;
use std::io::Cursor;

/// Creates a defective DOCX with the given number of paragraphs.
fn create_defective_docx(paragraph_count: usize) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));

    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    // Manifest without the styles and numbering overrides
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#,
    )
    .unwrap();

    // Absolute target
    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="/word/document.xml"/>
</Relationships>"#,
    )
    .unwrap();

    zip.start_file("word/_rels/document.xml.rels", options)
        .unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="/word/styles.xml"/>
</Relationships>"#,
    )
    .unwrap();

    zip.start_file("word/styles.xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults/>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
</w:styles>"#,
    )
    .unwrap();

    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>"#,
    );

    for i in 0..paragraph_count {
        let style = if i % 2 == 0 { "Normal".to_string() } else { format!("Requirement{}", i % 9) };
        content.push_str(&format!(
            r#"
    <w:p>
      <w:pPr><w:pStyle w:val="{}"/></w:pPr>
      <w:r>
        <w:t>Requirement {} text for benchmarking purposes.</w:t>
      </w:r>
    </w:p>"#,
            style, i
        ));
    }

    content.push_str(
        r#"
  </w:body>
</w:document>"#,
    );

    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(content.as_bytes()).unwrap();

    zip.finish().unwrap();
    buffer
}

/// Benchmark defect detection at various sizes.
fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection");

    for para_count in [10, 100, 1000, 5000].iter() {
        let data = create_defective_docx(*para_count);
        group.throughput(Throughput::Bytes(data.len() as u64));
        let container = OoxmlContainer::from_bytes(data).unwrap();

        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &container,
            |b, container| {
                b.iter(|| {
                    let _ = Detector::inspect(black_box(container));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the full rewrite into memory.
fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");
    let rewriter = Rewriter::new(DocumentKind::Document);

    for para_count in [10, 100, 1000].iter() {
        let data = create_defective_docx(*para_count);
        group.throughput(Throughput::Bytes(data.len() as u64));
        let container = OoxmlContainer::from_bytes(data).unwrap();

        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &container,
            |b, container| {
                b.iter(|| {
                    let (writer, _) = rewriter.build(black_box(container)).unwrap();
                    let _ = writer.finish();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark template generation including the fixer pass.
fn bench_template(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.dotx");
    let config = reqdot::TemplateConfig::default();

    c.bench_function("generate_template", |b| {
        b.iter(|| {
            let _ = reqdot::generate_template(black_box(&path), &config);
        });
    });
}

criterion_group!(benches, bench_detection, bench_rewrite, bench_template);
criterion_main!(benches);

use csvgate_detect::{
    ClassificationDetail, Classifier, DetectorConfig, DetectorVariant, SignatureSpec,
};
use std::sync::Arc;
use std::thread;

struct Sample {
    name: &'static str,
    content: Vec<u8>,
    filename: &'static str,
    expected_csv: bool,
    expected_mime: &'static str,
}

fn sample(
    name: &'static str,
    content: impl Into<Vec<u8>>,
    filename: &'static str,
    expected_csv: bool,
    expected_mime: &'static str,
) -> Sample {
    Sample {
        name,
        content: content.into(),
        filename,
        expected_csv,
        expected_mime,
    }
}

fn corpus() -> Vec<Sample> {
    vec![
        sample(
            "simple_csv",
            "name,age,city\nJohn,30,New York\nJane,25,Los Angeles",
            "simple.csv",
            true,
            "text/csv",
        ),
        sample(
            "csv_with_quotes",
            "Product,Price,Description\n\"Laptop\",999.99,\"High-end gaming laptop\"\n\"Mouse\",29.99,\"Wireless mouse\"",
            "products.csv",
            true,
            "text/csv",
        ),
        sample(
            "csv_many_columns",
            "id,name,email,phone,address,city,state,zip,country,notes\n1,John Doe,john@example.com,555-1234,123 Main St,Anytown,CA,12345,USA,Test user\n2,Jane Smith,jane@example.com,555-5678,456 Oak Ave,Somewhere,NY,67890,USA,Another user",
            "users.csv",
            true,
            "text/csv",
        ),
        sample(
            "csv_no_extension",
            "header1,header2,header3\nvalue1,value2,value3\nval4,val5,val6",
            "data.txt",
            true,
            "text/csv",
        ),
        sample(
            "csv_structure_without_hint",
            "alpha,beta\n1,2\n3,4",
            "data.txt",
            false,
            "text/plain",
        ),
        sample(
            "csv_keyword_with_txt_extension",
            "date,amount\n2024-01-01,10\n2024-01-02,12",
            "ledger.txt",
            true,
            "text/csv",
        ),
        sample(
            "plain_text",
            "This is just a plain text file.\nIt has multiple lines.\nSome lines have commas, but not in a structured way.\nThis is more like a document.",
            "document.txt",
            false,
            "text/plain",
        ),
        sample(
            "json_file",
            r#"{"name": "John", "age": 30, "city": "New York", "hobbies": ["reading", "swimming"]}"#,
            "data.json",
            false,
            "text/plain",
        ),
        sample(
            "html_file",
            "<html><head><title>Test</title></head><body><h1>Hello, World!</h1><p>This is a test page.</p></body></html>",
            "page.html",
            false,
            "text/html",
        ),
        sample(
            "xml_file",
            r#"<?xml version="1.0"?><root><item name="test" value="123"/><item name="another" value="456"/></root>"#,
            "data.xml",
            false,
            "text/xml",
        ),
        sample(
            "inconsistent_commas",
            "name,age\nJohn,30\nJane\nBob,25,extra",
            "bad.csv",
            false,
            "text/plain",
        ),
        sample("single_line_csv", "name,age,city", "header_only.csv", false, "text/plain"),
        sample("empty_file", "", "empty.csv", false, "application/octet-stream"),
        sample("single_column_csv", "names\nJohn\nJane\nBob", "single_col.csv", false, "text/plain"),
        sample(
            "csv_with_empty_lines",
            "name,age,city\nJohn,30,NYC\n\nJane,25,LA\n\nBob,35,Chicago",
            "with_blanks.csv",
            true,
            "text/csv",
        ),
        sample(
            "pdf_header",
            b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n1 0 obj\n".to_vec(),
            "report.pdf",
            false,
            "application/pdf",
        ),
        sample(
            "jpeg_header",
            b"\xff\xd8\xff\xe0\x00\x10JFIF\x00\x01\x01\x00\x00\x01".to_vec(),
            "cat.jpeg",
            false,
            "image/jpeg",
        ),
        sample(
            "png_header",
            b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR".to_vec(),
            "image.png",
            false,
            "image/png",
        ),
        sample(
            "zip_named_csv",
            b"PK\x03\x04\x14\x00\x00\x00name,age\n".to_vec(),
            "archive.csv",
            false,
            "application/zip",
        ),
        sample(
            "binary_garbage",
            vec![0x00, 0x9F, 0x92, 0x96, 0xFF, 0x10],
            "blob.csv",
            false,
            "application/octet-stream",
        ),
    ]
}

#[test]
fn test_corpus() {
    let classifier = Classifier::default();
    for s in corpus() {
        let verdict = classifier.classify(&s.content, Some(s.filename));
        assert_eq!(verdict.is_csv, s.expected_csv, "{}: is_csv", s.name);
        assert_eq!(verdict.mimetype, s.expected_mime, "{}: mimetype", s.name);
        let expected_message = if s.expected_csv {
            "File is a valid CSV"
        } else {
            "File is not a valid CSV"
        };
        assert_eq!(verdict.message, expected_message, "{}: message", s.name);
    }
}

#[test]
fn test_mimetype_is_never_empty() {
    let classifier = Classifier::default();
    let mut buffers: Vec<Vec<u8>> = corpus().into_iter().map(|s| s.content).collect();
    buffers.extend((0u8..=255).map(|b| vec![b]));
    buffers.push(vec![0xFF; 600]);
    buffers.push(vec![b','; 4096]);

    for bytes in buffers {
        let verdict = classifier.classify(&bytes, None);
        assert!(!verdict.mimetype.is_empty(), "empty mimetype for {:?}", bytes);
    }
}

#[test]
fn test_classification_is_idempotent() {
    let classifier = Classifier::default();
    for s in corpus() {
        let first = classifier.classify(&s.content, Some(s.filename));
        let second = classifier.classify(&s.content, Some(s.filename));
        assert_eq!(first, second, "{}", s.name);
    }
}

#[test]
fn test_jfif_label_preferred_over_generic_jpeg() {
    let classifier = Classifier::default();
    let verdict = classifier.classify(
        b"\xff\xd8\xff\xe0\x00\x10JFIF\x00\x01\x01\x00",
        Some("cat.jpeg"),
    );
    match verdict.detail {
        ClassificationDetail::Signature(detail) => {
            assert_eq!(detail.label.as_deref(), Some("JPEG image data, JFIF standard"));
        }
        other => panic!("unexpected detail {:?}", other),
    }
}

#[test]
fn test_keyword_must_be_in_leading_window() {
    let classifier = Classifier::default();
    let mut text = String::from("alpha,beta\n");
    for i in 0..40 {
        text.push_str(&format!("{},{}\n", i, i * 2));
    }
    text.push_str("name,total\n");
    assert!(text.find("name,").unwrap() > 200);

    assert!(!classifier.classify(text.as_bytes(), Some("numbers.txt")).is_csv);
    assert!(classifier.classify(text.as_bytes(), Some("numbers.csv")).is_csv);
}

#[test]
fn test_utf16_bom_is_text_but_not_csv() {
    let classifier = Classifier::default();
    let mut bytes = vec![0xFE, 0xFF];
    for unit in "name,age\nJohn,30\n".encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    let verdict = classifier.classify(&bytes, Some("wide.csv"));
    assert_eq!(verdict.mimetype, "text/plain");
    assert!(!verdict.is_csv);
}

#[test]
fn test_utf8_bom_csv_is_accepted() {
    let classifier = Classifier::default();
    let verdict = classifier.classify(b"\xef\xbb\xbfname,age\nJohn,30\n", Some("bom.csv"));
    assert!(verdict.is_csv);
    assert_eq!(verdict.mimetype, "text/csv");
}

#[test]
fn test_buffer_probe_variant_reports_both_detections() {
    let config = DetectorConfig {
        variant: DetectorVariant::BufferProbe,
        ..DetectorConfig::default()
    };
    let classifier = Classifier::new(&config).unwrap();
    let verdict = classifier.classify(b"%PDF-1.7\n%binary", Some("doc.pdf"));
    assert_eq!(verdict.mimetype, "application/pdf");
    match verdict.detail {
        ClassificationDetail::BufferProbe(detail) => {
            assert_eq!(detail.file_detection.as_deref(), Some("PDF document"));
            assert_eq!(detail.buffer_detection.as_deref(), Some("PDF document"));
            assert_eq!(detail.buffer_mime, "application/pdf");
        }
        other => panic!("unexpected detail {:?}", other),
    }
}

#[test]
fn test_custom_signature_without_mime_uses_label_keywords() {
    let config = DetectorConfig {
        signatures: vec![SignatureSpec {
            label: "Vendor JSON envelope".to_string(),
            pattern: "7B 22 76 65 6E 64 6F 72 22".to_string(),
            offset: 0,
            lookahead: 0,
            ignore_case: false,
            mime: None,
            specificity: None,
        }],
        ..DetectorConfig::default()
    };
    let classifier = Classifier::new(&config).unwrap();
    let verdict = classifier.classify(br#"{"vendor": "acme"}"#, Some("payload.bin"));
    assert_eq!(verdict.mimetype, "application/json");
    assert!(!verdict.is_csv);
}

#[test]
fn test_no_builtins_falls_back_to_probe() {
    let config = DetectorConfig {
        include_builtin_signatures: false,
        ..DetectorConfig::default()
    };
    let classifier = Classifier::new(&config).unwrap();
    assert_eq!(classifier.classify(b"%PDF-1.4", None).mimetype, "text/plain");
    assert!(classifier.classify(b"name,age\nJohn,30\n", Some("a.csv")).is_csv);
}

#[test]
fn test_shared_classifier_across_threads() {
    let classifier = Arc::new(Classifier::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let classifier = Arc::clone(&classifier);
            thread::spawn(move || {
                let text = format!("id,value\n{},{}\n{},{}\n", i, i * 10, i + 1, i * 20);
                classifier.classify(text.as_bytes(), Some("values.txt"))
            })
        })
        .collect();

    for handle in handles {
        let verdict = handle.join().unwrap();
        assert!(verdict.is_csv);
        assert_eq!(verdict.mimetype, "text/csv");
    }
}

//! Shared helpers for lockstate integration tests.

#![allow(dead_code)]

use std::{
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, Once},
};

use csv::ReaderBuilder;
use embedded_storage::{ReadStorage, Storage};
use lockstate::{
    Factor, FactorState, RfidSlot, RfidTag, StateStore,
    layout::SENTINEL,
    medium::Medium,
};

static TRACING_INIT: Once = Once::new();

/// Initialize a tracing subscriber writing to the test harness.
/// Controlled by `RUST_LOG`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a debug-level subscriber on this thread and return its output.
pub fn capture_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

/// A unique path for an image file, removed if it already exists.
pub fn scratch_image(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "lockstate-{}-{name}.img",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

/// A byte-addressable storage standing in for an EEPROM peripheral.
#[derive(Debug)]
pub struct MockEeprom {
    pub cells: Vec<u8>,
    pub writes: usize,
    /// Fail accesses touching this offset.
    pub broken: Option<usize>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MockError {
    OutOfBounds,
    Broken,
}

impl MockEeprom {
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![SENTINEL; capacity],
            writes: 0,
            broken: None,
        }
    }

    fn check(&self, offset: u32, len: usize) -> Result<std::ops::Range<usize>, MockError> {
        let range = offset as usize..offset as usize + len;
        if range.end > self.cells.len() {
            Err(MockError::OutOfBounds)?;
        }
        if self.broken.is_some_and(|b| range.contains(&b)) {
            Err(MockError::Broken)?;
        }
        Ok(range)
    }
}

impl ReadStorage for MockEeprom {
    type Error = MockError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.check(offset, bytes.len())?;
        bytes.copy_from_slice(&self.cells[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.cells.len()
    }
}

impl Storage for MockEeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let range = self.check(offset, bytes.len())?;
        self.cells[range].copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}

/// Run a scripted session from a CSV fixture against a store.
///
/// Each row is `operation, argument, argument, expected`. Rows whose operation
/// reads state produce an output, which is checked against the expected column
/// and returned in order.
pub fn run_script<M: Medium>(path: impl AsRef<Path>, store: &mut StateStore<M>) -> Vec<String>
where
    M::Error: std::fmt::Debug,
{
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)
        .unwrap();

    let mut outputs = vec![];

    for (line, row) in reader.records().enumerate() {
        let row = row.unwrap();
        let field = |i: usize| row.get(i).unwrap_or("");

        let output = match field(0) {
            "door.set" => {
                store.set_door_state(field(1) == "open").unwrap();
                None
            }
            "door.get" => Some(if store.get_door_state().unwrap() {
                "open".to_string()
            } else {
                "closed".to_string()
            }),
            "factor.set" => {
                store
                    .set_factor_state(factor(field(1)), state(field(2)))
                    .unwrap();
                None
            }
            "factor.get" => Some(
                format!("{:?}", store.get_factor_state(factor(field(1))).unwrap()).to_lowercase(),
            ),
            "pin.has" => Some(store.has_pin().unwrap().to_string()),
            "pin.set" => {
                store.set_pin(field(1)).unwrap();
                None
            }
            "pin.validate" => Some(store.validate_pin(field(1)).unwrap().to_string()),
            "rfid.set" => {
                store.set_rfid_slot(slot(field(1)), field(2)).unwrap();
                None
            }
            "rfid.delete" => {
                store.delete_rfid_slot(slot(field(1))).unwrap();
                None
            }
            "rfid.get" => {
                let slots = store.get_rfid_slots().unwrap();
                let shown: Vec<_> = RfidSlot::ALL
                    .into_iter()
                    .map(|s| {
                        slots
                            .get(s)
                            .and_then(RfidTag::as_str)
                            .unwrap_or("-")
                            .to_string()
                    })
                    .collect();
                Some(shown.join("|"))
            }
            "rfid.find" => {
                let tag = RfidTag::try_from(field(1)).unwrap();
                Some(match store.find_rfid(&tag).unwrap() {
                    Some(s) => s.index().to_string(),
                    None => "-".to_string(),
                })
            }
            "erase" => {
                store.erase().unwrap();
                None
            }
            op => panic!("unknown operation `{op}` on row {line}"),
        };

        if let Some(output) = output {
            assert_eq!(output, field(3), "row {line}: {}", field(0));
            outputs.push(output);
        }
    }

    outputs
}

fn factor(s: &str) -> Factor {
    match s {
        "pir" => Factor::Pir,
        "pin" => Factor::Pin,
        "otp" => Factor::Otp,
        "rfid" => Factor::Rfid,
        _ => panic!("unknown factor `{s}`"),
    }
}

fn state(s: &str) -> FactorState {
    match s {
        "closed" => FactorState::Closed,
        "open" => FactorState::Open,
        "inactive" => FactorState::Inactive,
        _ => panic!("unknown factor state `{s}`"),
    }
}

fn slot(s: &str) -> RfidSlot {
    RfidSlot::new(s.parse().unwrap()).unwrap()
}

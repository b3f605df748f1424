//! Config defaults, shared between serde `default =` hooks and validation.

/// Seconds the LED stays on after a cycle completes.
pub const DEFAULT_LED_DELAY_SECONDS: u64 = 10;

/// Seconds between scheduled meter reads.
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 3600;

/// Timeout for fetching a camera snapshot.
pub const DEFAULT_SNAPSHOT_TIMEOUT_SECONDS: u64 = 10;

/// Marker string the prompt instructs the model to reply with when the
/// meter cannot be read. The parser treats this as "try the next model",
/// not as a parse error, so prompt and parser must agree on it.
pub const DEFAULT_UNREADABLE_MARKER: &str = "FEHLER";

/// Model candidates in fallback priority order, newest capable model first.
pub const DEFAULT_MODEL_CANDIDATES: &[&str] = &[
    "claude-3-5-sonnet-20241022",
    "claude-3-5-sonnet-20240620",
    "claude-3-haiku-20240307",
];

/// Default instruction prompt for reading a water meter dial.
pub const DEFAULT_PROMPT: &str = "\
Analysiere dieses Wasserzähler-Bild und lies den aktuellen Zählerstand ab.

STRUKTUR des Zählers:
- OBEN: 5 große schwarze Ziffern (Format: 00000) - das sind die Hauptziffern
- UNTEN: Kleine runde Anzeigen mit roten Zeigern - das sind die Nachkommastellen

WICHTIGE REGELN:
1. Lese ALLE 5 Hauptziffern sorgfältig (auch führende Nullen beachten!)
2. Die Hauptziffern zeigen Kubikmeter (m³)
3. Die runden Anzeigen zeigen 0,1 und 0,01 m³
4. Wenn Hauptziffern '00087' sind, dann ist das 87 (nicht 987!)

BEISPIEL für diesen Zählertyp:
- Hauptziffern: 00087 → 87 m³
- Nachkommastellen: 18 → 0.18 m³
- ERGEBNIS: 87.18

Gib mir nur die finale Zahl zurück (z.B. 87.18).
Falls unklar, antworte mit 'FEHLER'.";

pub(crate) fn led_delay_seconds() -> u64 {
    DEFAULT_LED_DELAY_SECONDS
}

pub(crate) fn poll_interval_seconds() -> u64 {
    DEFAULT_POLL_INTERVAL_SECONDS
}

pub(crate) fn snapshot_timeout_seconds() -> u64 {
    DEFAULT_SNAPSHOT_TIMEOUT_SECONDS
}

pub(crate) fn prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

pub(crate) fn unreadable_marker() -> String {
    DEFAULT_UNREADABLE_MARKER.to_string()
}

pub(crate) fn model_candidates() -> Vec<String> {
    DEFAULT_MODEL_CANDIDATES.iter().map(|m| m.to_string()).collect()
}

pub(crate) fn gateway_bind() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn gateway_port() -> u16 {
    8084
}

pub(crate) fn log_level() -> String {
    "info".to_string()
}

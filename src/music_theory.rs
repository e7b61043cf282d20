// Music theory utilities for tapes
// Provides scales, note names, chords and roman-numeral progressions

use tape_core::{Step, Tape};
use thiserror::Error;

/// Note names in chromatic order
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MusicError {
    #[error("invalid scale type: {0}")]
    UnknownScale(String),

    #[error("invalid note name: {0}")]
    UnknownNote(String),

    #[error("invalid chord quality: {0}")]
    UnknownChord(String),

    #[error("invalid progression style: {0}")]
    UnknownProgression(String),

    #[error("invalid roman numeral: {0}")]
    UnknownNumeral(String),

    #[error("MIDI note out of range: {0}")]
    OutOfRange(i64),
}

pub type Result<T> = std::result::Result<T, MusicError>;

/// Get scale intervals for a given scale type
pub fn scale_intervals(scale_type: &str) -> Option<&'static [i64]> {
    match scale_type.to_lowercase().as_str() {
        "major" | "ionian" => Some(&[0, 2, 4, 5, 7, 9, 11]),
        "minor" | "aeolian" => Some(&[0, 2, 3, 5, 7, 8, 10]),
        "dorian" => Some(&[0, 2, 3, 5, 7, 9, 10]),
        "phrygian" => Some(&[0, 1, 3, 5, 7, 8, 10]),
        "lydian" => Some(&[0, 2, 4, 6, 7, 9, 11]),
        "mixolydian" => Some(&[0, 2, 4, 5, 7, 9, 10]),
        "locrian" => Some(&[0, 1, 3, 5, 6, 8, 10]),
        "pentatonic" | "pentatonic_major" => Some(&[0, 2, 4, 7, 9]),
        "pentatonic_minor" => Some(&[0, 3, 5, 7, 10]),
        "blues" => Some(&[0, 3, 5, 6, 7, 10]),
        "chromatic" => Some(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
        "wholetone" => Some(&[0, 2, 4, 6, 8, 10]),
        "harmonic_minor" => Some(&[0, 2, 3, 5, 7, 8, 11]),
        "melodic_minor" => Some(&[0, 2, 3, 5, 7, 9, 11]),
        _ => None,
    }
}

/// List available scale types
pub fn available_scales() -> Vec<&'static str> {
    vec![
        "major",
        "minor",
        "dorian",
        "phrygian",
        "lydian",
        "mixolydian",
        "aeolian",
        "locrian",
        "pentatonic",
        "pentatonic_minor",
        "blues",
        "chromatic",
        "wholetone",
        "harmonic_minor",
        "melodic_minor",
    ]
}

/// Pitch class (0-11) of a note name such as `C`, `f#` or `Bb`
pub fn pitch_class(name: &str) -> Result<i64> {
    let mut chars = name.trim().chars();
    let letter = chars
        .next()
        .ok_or_else(|| MusicError::UnknownNote(name.to_string()))?;

    let base = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(MusicError::UnknownNote(name.to_string())),
    };

    let mut offset = 0i64;
    for c in chars {
        match c {
            '#' => offset += 1,
            'b' => offset -= 1,
            _ => return Err(MusicError::UnknownNote(name.to_string())),
        }
    }

    Ok((base + offset).rem_euclid(12))
}

/// Convert a note name with octave to a MIDI number (`C4` = 60, `C#4` = 61)
pub fn note_to_midi(note: &str) -> Result<u8> {
    let note = note.trim();
    let split = note
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_ascii_digit() || *c == '-')
        .map(|(i, _)| i)
        .ok_or_else(|| MusicError::UnknownNote(note.to_string()))?;

    let (name, octave) = note.split_at(split);
    let octave: i64 = octave
        .parse()
        .map_err(|_| MusicError::UnknownNote(note.to_string()))?;

    // Accidentals may cross the octave boundary (B#3 is C4)
    let mut chars = name.chars();
    let natural = chars.next().map(|c| c.to_string()).unwrap_or_default();
    let shift: i64 = chars.map(|c| if c == '#' { 1 } else { -1 }).sum();
    let midi = (octave + 1) * 12 + pitch_class(&natural)? + shift;

    // Validate the accidentals themselves
    pitch_class(name)?;

    u8::try_from(midi)
        .ok()
        .filter(|m| *m <= 127)
        .ok_or(MusicError::OutOfRange(midi))
}

/// Convert a MIDI number to a note name with octave, using sharps
pub fn midi_to_note(midi: u8) -> Result<String> {
    if midi > 127 {
        return Err(MusicError::OutOfRange(midi as i64));
    }
    let octave = midi as i64 / 12 - 1;
    Ok(format!("{}{}", NOTE_NAMES[midi as usize % 12], octave))
}

/// Transpose a note name by semitones
pub fn transpose_note(root: &str, semitones: i64) -> Result<String> {
    let index = (pitch_class(root)? + semitones).rem_euclid(12) as usize;
    Ok(NOTE_NAMES[index].to_string())
}

/// Map 1-based scale degrees to semitone offsets from the root
///
/// Degrees past the end of the scale continue into the next octave, `0` and
/// negative degrees continue downward. Rests and non-integer steps pass through.
pub fn degrees_to_semitones(tape: &Tape, scale_type: &str) -> Result<Tape> {
    let intervals = scale_intervals(scale_type)
        .ok_or_else(|| MusicError::UnknownScale(scale_type.to_string()))?;
    let len = intervals.len() as i64;

    Ok(tape
        .iter()
        .map(|step| {
            step.map_int(|degree| {
                let index = degree - 1;
                index.div_euclid(len) * 12 + intervals[index.rem_euclid(len) as usize]
            })
        })
        .collect())
}

/// Map semitone offsets to MIDI note numbers above `root` in `octave`
///
/// Values that leave `0..=127` become rests.
pub fn semitones_to_notes(tape: &Tape, root: &str, octave: i64) -> Result<Tape> {
    let base = (octave + 1) * 12 + pitch_class(root)?;

    Ok(tape
        .iter()
        .map(|step| match step.as_int() {
            Some(offset) if (0..=127).contains(&(base + offset)) => Step::from(base + offset),
            Some(_) => Step::Rest,
            None => step.clone(),
        })
        .collect())
}

/// Scale degrees straight to MIDI notes
pub fn scale_tape(tape: &Tape, scale_type: &str, root: &str, octave: i64) -> Result<Tape> {
    let semitones = degrees_to_semitones(tape, scale_type)?;
    semitones_to_notes(&semitones, root, octave)
}

/// Get chord intervals for a chord quality
pub fn chord_intervals(quality: &str) -> Option<&'static [i64]> {
    match quality {
        "" | "major" | "maj" => Some(&[0, 4, 7]),
        "m" | "minor" | "min" => Some(&[0, 3, 7]),
        "dim" => Some(&[0, 3, 6]),
        "aug" => Some(&[0, 4, 8]),
        "sus2" => Some(&[0, 2, 7]),
        "sus4" => Some(&[0, 5, 7]),
        "7" => Some(&[0, 4, 7, 10]),
        "maj7" => Some(&[0, 4, 7, 11]),
        "m7" => Some(&[0, 3, 7, 10]),
        _ => None,
    }
}

/// Build a chord as a tape of MIDI notes
pub fn chord_tape(root: &str, quality: &str, octave: i64) -> Result<Tape> {
    let intervals =
        chord_intervals(quality).ok_or_else(|| MusicError::UnknownChord(quality.to_string()))?;
    let offsets: Tape = intervals.iter().map(|&i| Step::from(i)).collect();
    semitones_to_notes(&offsets, root, octave)
}

/// Get chord progression template for a style
fn progression_template(style: &str) -> Option<Vec<&'static str>> {
    match style.to_lowercase().as_str() {
        "pop" => Some(vec!["I", "V", "vi", "IV"]),
        "jazz" => Some(vec!["IIM7", "V7", "IM7"]),
        "blues" => Some(vec![
            "I7", "I7", "I7", "I7", "IV7", "IV7", "I7", "I7", "V7", "IV7", "I7", "V7",
        ]),
        "folk" => Some(vec!["I", "IV", "I", "V"]),
        "rock" => Some(vec!["I", "bVII", "IV", "I"]),
        "classical" => Some(vec!["I", "IV", "V", "I"]),
        "modal" => Some(vec!["i", "bVII", "IV", "i"]),
        "edm" => Some(vec!["i", "VI", "III", "VII"]),
        _ => None,
    }
}

/// List available progression styles
pub fn available_progressions() -> Vec<&'static str> {
    vec!["pop", "jazz", "blues", "folk", "rock", "classical", "modal", "edm"]
}

/// Roman numeral to (semitones above the key, chord suffix)
fn numeral_degree(numeral: &str) -> Option<(i64, &'static str)> {
    let mapped = match numeral {
        "I" => (0, ""),
        "I7" => (0, "7"),
        "i" => (0, "m"),
        "IM7" => (0, "maj7"),
        "ii" => (2, "m"),
        "IIM7" => (2, "m7"),
        "iii" => (4, "m"),
        "III" => (4, ""),
        "IV" => (5, ""),
        "IV7" => (5, "7"),
        "V" => (7, ""),
        "V7" => (7, "7"),
        "vi" => (9, "m"),
        "VI" => (9, ""),
        "VII" => (11, ""),
        "bVII" => (10, ""),
        _ => return None,
    };
    Some(mapped)
}

/// Convert a roman numeral to a chord name in `key`, e.g. `vi` in C is `Am`
pub fn roman_to_chord(key: &str, numeral: &str) -> Result<String> {
    let (semitones, suffix) =
        numeral_degree(numeral).ok_or_else(|| MusicError::UnknownNumeral(numeral.to_string()))?;
    Ok(format!("{}{}", transpose_note(key, semitones)?, suffix))
}

/// Chord names for a progression style, e.g. `C G Am F`
pub fn chord_progression(key: &str, style: &str) -> Result<String> {
    let progression = progression_template(style)
        .ok_or_else(|| MusicError::UnknownProgression(style.to_string()))?;

    let chords = progression
        .iter()
        .map(|numeral| roman_to_chord(key, numeral))
        .collect::<Result<Vec<_>>>()?;

    Ok(chords.join(" "))
}

/// One tape of MIDI notes per chord of a progression style
pub fn progression_tapes(key: &str, style: &str, octave: i64) -> Result<Vec<Tape>> {
    let progression = progression_template(style)
        .ok_or_else(|| MusicError::UnknownProgression(style.to_string()))?;

    progression
        .iter()
        .map(|numeral| {
            let (semitones, suffix) = numeral_degree(numeral)
                .ok_or_else(|| MusicError::UnknownNumeral(numeral.to_string()))?;
            let root = transpose_note(key, semitones)?;
            // Keep the chord root above the key root
            let octave = octave + (pitch_class(key)? + semitones) / 12;
            chord_tape(&root, suffix, octave)
        })
        .collect()
}

//! Line format for the backing file.
//!
//! Each task is stored on its own line as six `|`-delimited fields:
//!
//! ```text
//! id|description|category|priority|dueDateEpochSeconds|completedFlag
//! ```
//!
//! The completed flag is `1` for done and `0` otherwise; on read anything
//! other than `1` counts as not done. Text fields escape `\`, `|`, and line
//! breaks with a backslash, so text without those characters is stored
//! verbatim. Lines that fit six fields only as unescaped text are read as
//! written.

use crate::error::RecordError;
use crate::fields::normalise_priority;
use crate::task::Task;

const DELIMITER: char = '|';
const ESCAPE: char = '\\';
const FIELD_COUNT: usize = 6;

/// Serialise one task as a single line (without the trailing newline).
pub fn encode(task: &Task) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        task.id(),
        escape(task.description()),
        escape(task.category()),
        task.priority(),
        task.due_date(),
        if task.is_completed() { 1 } else { 0 }
    )
}

/// Parse one persisted line back into a task.
///
/// A line that only has six fields when backslashes are ignored (an
/// unescaped legacy line such as `1|C:\|misc|0|0|0`) is read verbatim.
pub fn decode(line: &str) -> Result<Task, RecordError> {
    let escaped = split_fields(line);
    let legacy: Vec<&str> = line.split(DELIMITER).collect();
    let (fields, verbatim) = if escaped.len() != FIELD_COUNT && legacy.len() == FIELD_COUNT {
        (legacy, true)
    } else {
        (escaped, false)
    };
    let [id, description, category, priority, due, completed]: [&str; FIELD_COUNT] =
        fields
            .as_slice()
            .try_into()
            .map_err(|_| RecordError::FieldCount { found: fields.len() })?;

    // u64::MAX is rejected so the allocator always has a next id.
    let id = id
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|&id| id != u64::MAX)
        .ok_or_else(|| RecordError::InvalidId(id.to_string()))?;
    let priority = priority
        .trim()
        .parse::<i64>()
        .map_err(|_| RecordError::InvalidPriority(priority.to_string()))?;
    let due = due
        .trim()
        .parse::<i64>()
        .map_err(|_| RecordError::InvalidDueDate(due.to_string()))?;

    let text = |field: &str| if verbatim { field.to_string() } else { unescape(field) };
    let mut task = Task::new(
        id,
        text(description),
        text(category),
        normalise_priority(priority),
        due,
    );
    task.set_completed(completed.trim() == "1");
    Ok(task)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            ESCAPE => out.push_str("\\\\"),
            DELIMITER => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(ch) = chars.next() {
        if ch != ESCAPE {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(ESCAPE) => out.push(ESCAPE),
            Some(DELIMITER) => out.push(DELIMITER),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            // Unknown sequences are kept as written.
            Some(other) => {
                out.push(ESCAPE);
                out.push(other);
            }
            None => out.push(ESCAPE),
        }
    }
    out
}

/// Split on delimiters that are not preceded by an escape.
///
/// Returned slices are still escaped; only the text fields are unescaped.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut start = 0;
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == ESCAPE {
            escaped = true;
        } else if ch == DELIMITER {
            fields.push(&line[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    fields.push(&line[start..]);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        let mut task = Task::new(2, "write report".into(), "work".into(), 5, 1_700_000_000);
        task.set_completed(true);
        task
    }

    #[test]
    fn test_encode_plain_text_matches_legacy_layout() {
        assert_eq!(encode(&sample()), "2|write report|work|5|1700000000|1");
        let open = Task::new(1, "buy milk".into(), "errand".into(), 2, 86_400);
        assert_eq!(encode(&open), "1|buy milk|errand|2|86400|0");
    }

    #[test]
    fn test_decode_legacy_line() {
        let task = decode("2|write report|work|5|1700000000|1").unwrap();
        assert_eq!(task, sample());
    }

    #[test]
    fn test_decode_completed_flag_only_one_is_true() {
        assert!(!decode("1|a|b|0|0|0").unwrap().is_completed());
        assert!(!decode("1|a|b|0|0|yes").unwrap().is_completed());
        assert!(!decode("1|a|b|0|0|").unwrap().is_completed());
        assert!(decode("1|a|b|0|0|1").unwrap().is_completed());
    }

    #[test]
    fn test_delimiter_and_newline_survive() {
        let task = Task::new(
            3,
            "pipes | and \\ slashes\nsecond line".into(),
            "a|b".into(),
            1,
            -60,
        );
        let line = encode(&task);
        assert!(!line.contains('\n'));
        assert_eq!(decode(&line).unwrap(), task);
    }

    #[test]
    fn test_empty_text_fields() {
        let task = Task::new(4, String::new(), String::new(), 0, 0);
        assert_eq!(encode(&task), "4|||0|0|0");
        assert_eq!(decode("4|||0|0|0").unwrap(), task);
    }

    #[test]
    fn test_unknown_escape_kept_literally() {
        let task = decode(r"1|C:\tmp\file|misc|0|0|0").unwrap();
        assert_eq!(task.description(), r"C:\tmp\file");
    }

    #[test]
    fn test_legacy_backslash_before_delimiter() {
        let task = decode(r"1|C:\|misc|0|0|0").unwrap();
        assert_eq!(task.description(), r"C:\");
        assert_eq!(task.category(), "misc");
        assert_eq!(decode(&encode(&task)).unwrap(), task);
    }

    #[test]
    fn test_completed_flag_tolerates_trailing_cr() {
        assert!(decode("1|a|b|0|0|1\r").unwrap().is_completed());
        assert!(decode("1|a|b|0|0| 1 ").unwrap().is_completed());
    }

    #[test]
    fn test_max_id_rejected() {
        let line = format!("{}|a|b|1|0|0", u64::MAX);
        assert_eq!(decode(&line), Err(RecordError::InvalidId(u64::MAX.to_string())));
        let below = format!("{}|a|b|1|0|0", u64::MAX - 1);
        assert_eq!(decode(&below).unwrap().id(), u64::MAX - 1);
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(
            decode("1|only|four|fields"),
            Err(RecordError::FieldCount { found: 4 })
        );
        assert_eq!(
            decode("1|a|b|2|3|0|extra"),
            Err(RecordError::FieldCount { found: 7 })
        );
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(
            decode("x|a|b|2|3|0"),
            Err(RecordError::InvalidId("x".into()))
        );
        assert_eq!(
            decode("1|a|b|high|3|0"),
            Err(RecordError::InvalidPriority("high".into()))
        );
        assert_eq!(
            decode("1|a|b|2|soon|0"),
            Err(RecordError::InvalidDueDate("soon".into()))
        );
    }

    #[test]
    fn test_out_of_range_priority_is_normalised() {
        assert_eq!(decode("1|a|b|9|0|0").unwrap().priority(), 0);
        assert_eq!(decode("1|a|b|-2|0|0").unwrap().priority(), 0);
    }
}

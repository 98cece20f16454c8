/// A request for words matching a letter pattern (the escape hatch used when a slot's
/// domain empties during search).
pub const PATTERN_MATCH: &str = "pattern_match";

/// A request for a themed word list with clues.
pub const THEMED_LIST: &str = "themed_list";

/// A request for clues covering an already-solved set of words.
pub const CLUE_BATCH: &str = "clue_batch";

#![allow(dead_code)]

pub mod mocks;

pub const HEADERS: [&str; 4] = ["Player Name", "Position", "Nicknames", "Years Active"];

pub const SKIPPY: [&str; 4] = [
    "Skippy Peterson",
    "First Base",
    "\"Blue Dog\", \"The Magician\"",
    "1908-1913",
];

pub const BUD: [&str; 4] = [
    "Bud Grimsby",
    "Center Field",
    "\"The Reaper\", \"Longneck\"",
    "1910-1917",
];

pub const VIC: [&str; 4] = [
    "Vic Crumb",
    "Shortstop",
    "\"Fat Vic\", \"Icy Hot\"",
    "1911-1912",
];

pub const SAMPLE_WITH_HEADER: &str = r#"Player Name,Position,Nicknames,Years Active
Skippy Peterson,First Base,"""Blue Dog"", ""The Magician""",1908-1913
Bud Grimsby,Center Field,"""The Reaper"", ""Longneck""",1910-1917
Vic Crumb,Shortstop,"""Fat Vic"", ""Icy Hot""",1911-1912
"#;

pub const SAMPLE_WITHOUT_HEADER: &str = r#"Skippy Peterson,First Base,"""Blue Dog"", ""The Magician""",1908-1913
Bud Grimsby,Center Field,"""The Reaper"", ""Longneck""",1910-1917
Vic Crumb,Shortstop,"""Fat Vic"", ""Icy Hot""",1911-1912
"#;

pub const SAMPLE_WITH_EMPTY_LINES: &str = r#"Skippy Peterson,First Base,"""Blue Dog"", ""The Magician""",1908-1913


Vic Crumb,Shortstop,"""Fat Vic"", ""Icy Hot""",1911-1912

"#;

pub const SAMPLE_WITH_NOT_TRIMMED_CONTENT: &str = r#"  Skippy Peterson ,First Base   ,"""Blue Dog"", ""The Magician""",  1908-1913
Vic Crumb   ,   Shortstop,"""Fat Vic"", ""Icy Hot""",1911-1912
"#;

pub const SAMPLE_WITH_CUSTOM_DELIMITER: &str = r#"Player Name:Position:Nicknames:Years Active
Skippy Peterson:First Base:"""Blue Dog"", ""The Magician""":1908-1913
Bud Grimsby:Center Field:"""The Reaper"", ""Longneck""":1910-1917
Vic Crumb:Shortstop:"""Fat Vic"", ""Icy Hot""":1911-1912
"#;

pub const SAMPLE_WITH_NO_RECORDS_AND_HEADERS: &str = "Player Name,Position,Nicknames,Years Active\n";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#![no_main]

use libfuzzer_sys::fuzz_target;
use quizvault::extract::{current_question_number, extract, PageContent};
use quizvault::{fingerprint, Fingerprint};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Split the input into a prompt, a header and lettered choices.
    let mut lines = text.lines();
    let prompt = lines.next().unwrap_or_default();
    let header = lines.next().unwrap_or_default();
    let mut page = PageContent::with_prompt(prompt).header(header);
    for (i, line) in lines.enumerate().take(8) {
        let letter = ((b'A' + i as u8) as char).to_string();
        page = if line.len() % 2 == 0 {
            page.correct_choice(letter, line)
        } else {
            page.choice(letter, line)
        };
    }

    let record = extract(&page).expect("page has a prompt");
    let fp = fingerprint(&record.question);
    assert_eq!(Fingerprint::parse(fp.as_str()).unwrap(), fp);
    let _ = current_question_number(&page);
});

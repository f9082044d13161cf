//! End-to-end keystroke scenarios driven through a scripted terminal.

mod common;

use common::{typed, ScriptedTerminal};
use tideline::{
    ansi_color, ctrl_key, meta_key, Color, Editor, KillAction, ReadlineError, DELETE_KEY, META,
};

fn editor(keys: Vec<i32>) -> Editor<ScriptedTerminal> {
    Editor::with_terminal(ScriptedTerminal::new(keys))
}

#[test]
fn basic_insert_and_accept() {
    let mut keys = typed("hi");
    keys.push(ctrl_key('M'));
    let mut ed = editor(keys);

    let before = ed.history_size();
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "hi");
    ed.history_add(&line);
    assert_eq!(ed.history_size(), before + 1);

    // raw mode released exactly as often as acquired
    let term = ed.terminal();
    assert_eq!(term.raw_enables, term.raw_disables);
    assert!(term.written.contains("> "));
}

#[test]
fn word_kill_and_yank_restores_the_line() {
    let keys = vec![META | ctrl_key('H'), ctrl_key('Y'), ctrl_key('M')];
    let mut ed = editor(keys);
    ed.set_preload("foo bar");

    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "foo bar");
    assert_eq!(ed.kill_ring().yank(), Some("bar".chars().collect()));
    assert_eq!(ed.kill_ring().last_action, KillAction::Yank);
}

#[test]
fn tab_extends_to_the_common_prefix() {
    let keys = vec![ctrl_key('I'), ctrl_key('M')];
    let mut ed = editor(keys);
    ed.set_preload("pri");
    ed.set_completion_callback(Box::new(|_input, _context| {
        vec!["print".into(), "printf".into(), "println".into()]
    }));

    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "print");
}

#[test]
fn double_tab_lists_the_candidates() {
    // first tab beeps and extends to the common prefix; the next tab pair
    // lists all three candidates below the prompt
    let keys = vec![ctrl_key('I'), ctrl_key('I'), ctrl_key('I'), ctrl_key('M')];
    let mut ed = editor(keys);
    ed.set_preload("pri");
    ed.set_no_color(true);
    ed.set_double_tab_completion(true);
    ed.set_beep_on_ambiguous_completion(true);
    ed.set_completion_callback(Box::new(|_input, _context| {
        vec!["print".into(), "printf".into(), "println".into()]
    }));

    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "print");
    let term = ed.terminal();
    assert!(term.beeps >= 1);
    assert!(term.written.contains("printf"));
    assert!(term.written.contains("println"));
}

#[test]
fn reverse_search_recalls_a_matching_line() {
    let mut keys = vec![ctrl_key('R')];
    keys.extend(typed("gam"));
    keys.push(ctrl_key('M'));
    let mut ed = editor(keys);
    for line in ["alpha", "beta", "gamma-delta"] {
        ed.history_add(line);
    }

    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "gamma-delta");
    assert!(ed.terminal().written.contains("(reverse-i-search)`gam': "));
}

#[test]
fn matching_brace_is_accented() {
    // cursor moved onto the closing paren; its partner at index 0 renders in
    // bright red, immediately reset to the default color
    let keys = vec![tideline::LEFT_KEY, ctrl_key('M')];
    let mut ed = editor(keys);
    ed.set_preload("(x + y)");

    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "(x + y)");
    let accent = format!("{}({}", ansi_color(Color::BrightRed), ansi_color(Color::Default));
    assert!(ed.terminal().written.contains(&accent));
}

#[test]
fn interrupt_reports_and_echoes_ctrl_c() {
    let mut keys = typed("abc");
    keys.push(ctrl_key('C'));
    let mut ed = editor(keys);

    let err = ed.input("> ").expect_err("interrupted");
    assert!(matches!(err, ReadlineError::Interrupted));
    let term = ed.terminal();
    assert!(term.written.contains("^C\r\n"));
    assert_eq!(term.raw_enables, term.raw_disables);
}

#[test]
fn eof_on_empty_line() {
    let keys = vec![ctrl_key('D')];
    let mut ed = editor(keys);
    let err = ed.input("> ").expect_err("end of input");
    assert!(matches!(err, ReadlineError::Eof));
}

#[test]
fn ctrl_d_deletes_when_the_line_is_not_empty() {
    let keys = vec![
        ctrl_key('A'),
        ctrl_key('D'),
        ctrl_key('M'),
    ];
    let mut ed = editor(keys);
    ed.set_preload("xab");
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "ab");
}

#[test]
fn transpose_swaps_and_advances() {
    // "ab" with cursor at end: the two preceding code points swap
    let mut keys = typed("ab");
    keys.push(ctrl_key('T'));
    keys.push(ctrl_key('M'));
    let mut ed = editor(keys);
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "ba");
}

#[test]
fn transpose_mid_line_straddles_the_cursor() {
    let keys = vec![
        tideline::HOME_KEY,
        tideline::RIGHT_KEY,
        ctrl_key('T'),
        ctrl_key('M'),
    ];
    let mut ed = editor(keys);
    ed.set_preload("abc");
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "bac");
}

#[test]
fn kill_line_halves_and_yank_round_trip() {
    // Ctrl-U at end of line kills everything, yank puts it back
    let keys = vec![ctrl_key('U'), ctrl_key('Y'), ctrl_key('M')];
    let mut ed = editor(keys);
    ed.set_preload("kill me");
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "kill me");
}

#[test]
fn consecutive_word_kills_merge_for_a_single_yank() {
    // two backward word kills merge; one yank restores both words
    let keys = vec![
        META | ctrl_key('H'),
        META | ctrl_key('H'),
        ctrl_key('Y'),
        ctrl_key('M'),
    ];
    let mut ed = editor(keys);
    ed.set_preload("one two");
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "one two");
    assert_eq!(ed.kill_ring().yank(), Some("one two".chars().collect()));
}

#[test]
fn yank_pop_cycles_earlier_kills() {
    // kill "bb", then "aa " (separated by a cursor move), yank, yank-pop
    let keys = vec![
        META | ctrl_key('H'),
        ctrl_key('B'),
        ctrl_key('F'),
        ctrl_key('U'),
        ctrl_key('Y'),
        meta_key('y'),
        ctrl_key('M'),
    ];
    let mut ed = editor(keys);
    ed.set_preload("aa bb");
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "bb");
}

#[test]
fn word_case_operations() {
    let keys = vec![
        tideline::HOME_KEY,
        meta_key('c'),
        tideline::HOME_KEY,
        meta_key('u'),
        ctrl_key('M'),
    ];
    let mut ed = editor(keys);
    ed.set_preload("hello world");
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "HELLO world");
}

#[test]
fn history_recall_walks_previous_lines() {
    let keys = vec![tideline::UP_KEY, tideline::UP_KEY, ctrl_key('M')];
    let mut ed = editor(keys);
    ed.history_add("first");
    ed.history_add("second");
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "first");
}

#[test]
fn history_jump_reaches_the_oldest_entry() {
    let keys = vec![tideline::PAGE_UP_KEY, ctrl_key('M')];
    let mut ed = editor(keys);
    ed.history_add("oldest");
    ed.history_add("newest");
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "oldest");
}

#[test]
fn prefix_search_honours_the_anchor() {
    let mut keys = typed("pr");
    keys.push(meta_key('p'));
    keys.push(meta_key('p'));
    keys.push(ctrl_key('M'));
    let mut ed = editor(keys);
    ed.history_add("print 1");
    ed.history_add("echo hi");
    ed.history_add("proc");
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "print 1");
}

#[test]
fn deleting_forward_with_the_delete_key() {
    let keys = vec![tideline::HOME_KEY, DELETE_KEY, ctrl_key('M')];
    let mut ed = editor(keys);
    ed.set_preload("abc");
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "bc");
}

#[test]
fn single_hint_is_shown_inline_but_not_committed() {
    let mut keys = typed("pri");
    keys.push(ctrl_key('M'));
    let mut ed = editor(keys);
    ed.set_hint_callback(Box::new(|_input, _context, _color| {
        vec!["println".into()]
    }));

    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "pri");
    // the continuation beyond the typed context appears on screen
    assert!(ed.terminal().written.contains("ntln"));
}

#[test]
fn highlighter_colors_are_interleaved_into_the_display() {
    let mut keys = typed("ab");
    keys.push(ctrl_key('M'));
    let mut ed = editor(keys);
    ed.set_highlighter_callback(Box::new(|_line, colors| {
        if let Some(first) = colors.first_mut() {
            *first = Color::Green;
        }
    }));

    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "ab");
    assert!(ed
        .terminal()
        .written
        .contains(&format!("{}a", ansi_color(Color::Green))));
}

#[test]
fn resize_redraws_the_prompt_and_line() {
    let mut keys = typed("abc");
    keys.push(0);
    keys.push(ctrl_key('M'));
    let mut ed = editor(keys);
    ed.terminal_mut().resizes.push_back(40);

    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "abc");
    // the prompt was painted at least twice: once on entry, once on resize
    let prompts = ed.terminal().written.matches("> ").count();
    assert!(prompts >= 2, "prompt repainted on resize");
}

#[test]
fn unsupported_key_beeps_and_changes_nothing() {
    let keys = vec![ctrl_key('V'), ctrl_key('M')];
    let mut ed = editor(keys);
    ed.set_preload("keep");
    let line = ed.input("> ").expect("line accepted");
    assert_eq!(line, "keep");
    assert_eq!(ed.terminal().beeps, 1);
}

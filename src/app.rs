/// AppState: everything the terminal front-end needs between frames.
///
/// Control flow for one command:
///   select → type (matcher) → confirm delay → `GameSession::execute_action`
///   → on success, enqueue the pose change into the animation queue.
///
/// While an animation plays or a typed command waits out its confirm delay
/// the app is *busy*: selection, typing and undo/redo are ignored. Reset
/// is always allowed and cancels whatever is in flight.
///
/// All timing takes an explicit `now_ms` so tests can drive the clock.

use log::debug;

use crate::config::GameConfig;
use crate::config::TimingConfig;
use crate::domain::action::ActionKind;
use crate::sim::commands::{Availability, Command, Difficulty, COMMANDS};
use crate::sim::event::GameEvent;
use crate::sim::level::LevelDef;
use crate::sim::session::GameSession;
use crate::typing::matcher::{KeyOutcome, Matcher};
use crate::ui::animation::{AnimFrame, AnimationQueue, TerminalFrames, Transition};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    LevelSelect,
    Playing,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Feedback {
    Idle,
    Correct,
    Wrong,
}

/// The command being typed.
pub struct TypingPanel {
    pub command: &'static Command,
    pub matcher: Matcher,
    pub feedback: Feedback,
    feedback_until: Option<u64>,
    /// Set once the word is complete; the action runs at this time.
    confirm_at: Option<u64>,
}

impl TypingPanel {
    fn new(command: &'static Command) -> Self {
        TypingPanel {
            command,
            matcher: Matcher::new(command.kana),
            feedback: Feedback::Idle,
            feedback_until: None,
            confirm_at: None,
        }
    }

    pub fn is_confirming(&self) -> bool {
        self.confirm_at.is_some()
    }

    fn flash(&mut self, feedback: Feedback, until: Option<u64>) {
        self.feedback = feedback;
        self.feedback_until = until;
    }
}

pub struct AppState {
    pub phase: Phase,
    pub session: GameSession,
    pub levels: Vec<LevelDef>,
    pub level_index: usize,
    pub select_cursor: usize,
    pub palette_cursor: usize,
    pub typing: Option<TypingPanel>,
    pub difficulty: Difficulty,
    pub show_guide: bool,
    pub anims: AnimationQueue<TerminalFrames>,
    /// Latest interpolated pose, while an animation plays.
    pub anim_frame: Option<AnimFrame>,
    pub message: String,
    timing: TimingConfig,
}

impl AppState {
    pub fn new(config: &GameConfig, levels: Vec<LevelDef>) -> Self {
        let timing = config.timing.clone();
        let mut session = GameSession::new();
        if let Some(first) = levels.first() {
            session.init_level(first.clone());
        }
        AppState {
            phase: Phase::LevelSelect,
            session,
            levels,
            level_index: 0,
            select_cursor: 0,
            palette_cursor: 0,
            typing: None,
            difficulty: config.play.difficulty,
            show_guide: config.play.show_guide,
            anims: AnimationQueue::new(
                TerminalFrames::new(),
                timing.move_duration_ms,
                timing.turn_duration_ms,
            ),
            anim_frame: None,
            message: String::new(),
            timing,
        }
    }

    // ── Queries ──

    pub fn is_busy(&self) -> bool {
        self.anims.is_animating() || self.typing.as_ref().is_some_and(|t| t.is_confirming())
    }

    pub fn is_cleared(&self) -> bool {
        self.session.world().cleared
    }

    pub fn has_next_level(&self) -> bool {
        self.level_index + 1 < self.levels.len()
    }

    pub fn availability(&self, cmd: &Command) -> Availability {
        self.session.availability(cmd, self.difficulty)
    }

    // ── Level selection ──

    pub fn open_level_select(&mut self) {
        self.phase = Phase::LevelSelect;
        self.select_cursor = self.level_index;
    }

    /// Leave the level list without changing level. Only possible once a
    /// level is loaded.
    pub fn close_level_select(&mut self) {
        if self.session.level().is_some() {
            self.phase = Phase::Playing;
        }
    }

    pub fn move_select_cursor(&mut self, delta: i32) {
        if self.levels.is_empty() {
            return;
        }
        let n = self.levels.len() as i32;
        self.select_cursor = (self.select_cursor as i32 + delta).rem_euclid(n) as usize;
    }

    pub fn confirm_level_select(&mut self) {
        self.start_level(self.select_cursor);
    }

    pub fn start_level(&mut self, index: usize) {
        let Some(level) = self.levels.get(index) else {
            return;
        };
        self.session.init_level(level.clone());
        self.level_index = index;
        self.select_cursor = index;
        self.palette_cursor = 0;
        self.phase = Phase::Playing;
        self.cancel_in_flight();
        self.message.clear();
    }

    /// Advance after a clear. Past the last level, back to the level list.
    pub fn next_level(&mut self) {
        if !self.is_cleared() {
            return;
        }
        if self.has_next_level() {
            self.start_level(self.level_index + 1);
        } else {
            self.open_level_select();
        }
    }

    // ── Command palette ──

    pub fn move_palette_cursor(&mut self, delta: i32) {
        let n = COMMANDS.len() as i32;
        self.palette_cursor = (self.palette_cursor as i32 + delta).rem_euclid(n) as usize;
    }

    /// Pick a command to type. Ignored when busy, cleared, or when the
    /// command is greyed out or hidden.
    pub fn select_command(&mut self, index: usize) -> bool {
        if self.is_busy() || self.is_cleared() {
            return false;
        }
        let Some(cmd) = COMMANDS.get(index) else {
            return false;
        };
        if !self.availability(cmd).selectable() {
            return false;
        }
        self.palette_cursor = index;
        self.typing = Some(TypingPanel::new(cmd));
        self.message.clear();
        true
    }

    pub fn cancel_typing(&mut self) {
        if self.is_busy() {
            return;
        }
        self.typing = None;
    }

    // ── Typing ──

    /// Feed one printable key to the matcher.
    pub fn type_key(&mut self, key: char, now_ms: u64) -> Vec<GameEvent> {
        if self.is_busy() || self.is_cleared() {
            return vec![];
        }
        let correct_until = now_ms + self.timing.correct_flash_ms;
        let wrong_until = now_ms + self.timing.wrong_flash_ms;
        let confirm_at = now_ms + self.timing.confirm_delay_ms;
        let Some(panel) = self.typing.as_mut() else {
            return vec![];
        };

        match panel.matcher.process_key(key) {
            KeyOutcome::Correct => {
                panel.flash(Feedback::Correct, Some(correct_until));
                vec![GameEvent::KeyAccepted]
            }
            KeyOutcome::Wrong => {
                panel.flash(Feedback::Wrong, Some(wrong_until));
                vec![GameEvent::KeyRejected]
            }
            KeyOutcome::Complete => {
                panel.flash(Feedback::Correct, None);
                panel.confirm_at = Some(confirm_at);
                vec![GameEvent::KeyAccepted, GameEvent::CommandTyped(panel.command.action)]
            }
        }
    }

    // ── Per-frame update ──

    /// Expire feedback, run a confirmed command, and deliver a due
    /// animation frame.
    pub fn tick(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let mut events = vec![];

        let mut confirmed = None;
        if let Some(panel) = self.typing.as_mut() {
            if panel.feedback_until.is_some_and(|t| now_ms >= t) {
                panel.flash(Feedback::Idle, None);
            }
            if panel.confirm_at.is_some_and(|t| now_ms >= t) {
                confirmed = Some(panel.command.action);
            }
        }
        if let Some(kind) = confirmed {
            self.typing = None;
            events.extend(self.dispatch(kind));
        }

        if self.anims.driver_mut().take_due().is_some() {
            self.anim_frame = self.anims.on_frame(now_ms as f64);
        }
        if !self.anims.is_animating() {
            self.anim_frame = None;
        }

        events
    }

    fn dispatch(&mut self, kind: ActionKind) -> Vec<GameEvent> {
        let before = self.session.world().character;
        if !self.session.execute_action(kind) {
            self.message = blocked_message(kind).to_string();
            return vec![GameEvent::ActionRejected(kind)];
        }

        let mut events = vec![GameEvent::ActionApplied(kind)];
        let after = self.session.world().character;
        if let Some(t) = Transition::between(before, after) {
            self.anims.enqueue(t);
        }
        if self.is_cleared() {
            events.push(GameEvent::LevelCleared);
        }
        events
    }

    // ── History ──

    pub fn undo(&mut self) -> Vec<GameEvent> {
        if self.is_busy() {
            return vec![];
        }
        self.typing = None;
        if self.session.undo() {
            vec![GameEvent::Undone]
        } else {
            vec![]
        }
    }

    pub fn redo(&mut self) -> Vec<GameEvent> {
        if self.is_busy() {
            return vec![];
        }
        self.typing = None;
        if self.session.redo() {
            vec![GameEvent::Redone]
        } else {
            vec![]
        }
    }

    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.cancel_in_flight();
        self.session.reset();
        self.message.clear();
        vec![GameEvent::Reset]
    }

    pub fn toggle_difficulty(&mut self) {
        self.difficulty = self.difficulty.toggled();
        debug!("difficulty: {}", self.difficulty.label());
    }

    fn cancel_in_flight(&mut self) {
        self.anims.clear();
        self.anim_frame = None;
        self.typing = None;
    }
}

fn blocked_message(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::MoveForward => "すすめないよ！",
        ActionKind::TurnRight | ActionKind::TurnLeft => "むけないよ！",
        ActionKind::PickUp => "ここにはなにもないよ",
        ActionKind::UnlockDoor => "かぎがあかないよ",
        ActionKind::OpenDoor => "とびらがひらかないよ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Position;
    use crate::sim::commands::command_for;
    use crate::sim::level::embedded_levels;

    fn app() -> AppState {
        let mut a = AppState::new(&GameConfig::default(), embedded_levels());
        a.start_level(0);
        a
    }

    fn index_of(kind: ActionKind) -> usize {
        COMMANDS.iter().position(|c| c.action == kind).unwrap()
    }

    /// Select, type the canonical spelling, wait out the confirm delay and
    /// the animation. Returns the events and the time reached.
    fn run_command(a: &mut AppState, kind: ActionKind, mut now: u64) -> (Vec<GameEvent>, u64) {
        assert!(a.select_command(index_of(kind)), "{kind:?} not selectable");
        let mut events = vec![];
        for k in command_for(kind).romaji().chars() {
            events.extend(a.type_key(k, now));
            now += 10;
        }
        now += 300;
        events.extend(a.tick(now));
        for _ in 0..64 {
            if !a.is_busy() {
                break;
            }
            now += 16;
            events.extend(a.tick(now));
        }
        (events, now)
    }

    #[test]
    fn starts_on_level_select() {
        let a = AppState::new(&GameConfig::default(), embedded_levels());
        assert_eq!(a.phase, Phase::LevelSelect);
        assert!(a.session.level().is_some());
    }

    #[test]
    fn typed_command_runs_after_confirm_delay() {
        let mut a = app();
        assert!(a.select_command(index_of(ActionKind::MoveForward)));
        let keys = command_for(ActionKind::MoveForward).romaji();
        let mut events = vec![];
        for k in keys.chars() {
            events.extend(a.type_key(k, 0));
        }
        assert_eq!(events.last(), Some(&GameEvent::CommandTyped(ActionKind::MoveForward)));
        assert!(a.is_busy());

        assert!(a.tick(299).is_empty());
        assert_eq!(a.session.world().character.pos, Position::new(0, 4));

        let events = a.tick(300);
        assert_eq!(events, vec![GameEvent::ActionApplied(ActionKind::MoveForward)]);
        assert_eq!(a.session.world().character.pos, Position::new(1, 4));
        assert!(a.typing.is_none());
        assert!(a.anims.is_animating());
        assert_eq!(a.session.move_count(), 1);
    }

    #[test]
    fn busy_while_animating() {
        let mut a = app();
        a.select_command(index_of(ActionKind::MoveForward));
        for k in command_for(ActionKind::MoveForward).romaji().chars() {
            a.type_key(k, 0);
        }
        a.tick(300);
        a.tick(316);
        assert!(a.anim_frame.is_some());
        assert!(!a.select_command(index_of(ActionKind::TurnLeft)));
        assert!(a.undo().is_empty());

        a.tick(600);
        assert!(!a.is_busy());
        assert!(a.anim_frame.is_none());
        assert_eq!(a.undo(), vec![GameEvent::Undone]);
        assert_eq!(a.session.world().character.pos, Position::new(0, 4));
        assert_eq!(a.redo(), vec![GameEvent::Redone]);
        assert_eq!(a.session.world().character.pos, Position::new(1, 4));
    }

    #[test]
    fn wrong_key_flashes_then_clears() {
        let mut a = app();
        a.select_command(index_of(ActionKind::TurnRight));
        assert_eq!(a.type_key('m', 0), vec![GameEvent::KeyAccepted]);
        assert_eq!(a.type_key('z', 10), vec![GameEvent::KeyRejected]);
        let panel = a.typing.as_ref().unwrap();
        assert_eq!(panel.feedback, Feedback::Wrong);
        assert_eq!(panel.matcher.current_buffer(), &['m']);

        a.tick(200);
        assert_eq!(a.typing.as_ref().unwrap().feedback, Feedback::Wrong);
        a.tick(310);
        assert_eq!(a.typing.as_ref().unwrap().feedback, Feedback::Idle);
    }

    #[test]
    fn contextual_command_disabled_until_usable() {
        let mut a = app();
        a.start_level(6); // key and door
        assert_eq!(a.availability(command_for(ActionKind::PickUp)), Availability::Disabled);
        assert!(!a.select_command(index_of(ActionKind::PickUp)));

        a.toggle_difficulty();
        assert_eq!(a.availability(command_for(ActionKind::PickUp)), Availability::Hidden);

        let mut now = 0;
        for _ in 0..3 {
            now = run_command(&mut a, ActionKind::MoveForward, now).1;
        }
        assert_eq!(a.availability(command_for(ActionKind::PickUp)), Availability::Enabled);
        let (events, _) = run_command(&mut a, ActionKind::PickUp, now);
        assert!(events.contains(&GameEvent::ActionApplied(ActionKind::PickUp)));
        assert_eq!(a.session.world().inventory, vec!["key".to_string()]);
    }

    #[test]
    fn rejected_action_sets_message() {
        let mut a = app();
        // stage 1 starts at the bottom row facing right; turn to face down
        let (_, now) = run_command(&mut a, ActionKind::TurnRight, 0);
        let (events, _) = run_command(&mut a, ActionKind::MoveForward, now);
        assert!(events.contains(&GameEvent::ActionRejected(ActionKind::MoveForward)));
        assert!(!a.message.is_empty());
        assert_eq!(a.session.move_count(), 1);
    }

    #[test]
    fn clearing_and_moving_on() {
        let mut a = app();
        let mut now = 0;
        let mut all = vec![];
        for _ in 0..4 {
            let (events, t) = run_command(&mut a, ActionKind::MoveForward, now);
            all.extend(events);
            now = t;
        }
        assert!(all.contains(&GameEvent::LevelCleared));
        assert!(a.is_cleared());
        assert!(!a.select_command(index_of(ActionKind::TurnLeft)));

        a.next_level();
        assert_eq!(a.level_index, 1);
        assert!(!a.is_cleared());
        assert_eq!(a.session.move_count(), 0);
    }

    #[test]
    fn next_after_last_level_opens_list() {
        let mut a = app();
        let last = a.levels.len() - 1;
        a.start_level(last);
        let script = a.levels[last].suggested_commands.clone().unwrap();
        let mut now = 0;
        for kind in script {
            now = run_command(&mut a, kind, now).1;
        }
        assert!(a.is_cleared());
        assert!(!a.has_next_level());
        a.next_level();
        assert_eq!(a.phase, Phase::LevelSelect);
    }

    #[test]
    fn reset_cancels_pending_command() {
        let mut a = app();
        a.select_command(index_of(ActionKind::MoveForward));
        for k in command_for(ActionKind::MoveForward).romaji().chars() {
            a.type_key(k, 0);
        }
        assert_eq!(a.reset(), vec![GameEvent::Reset]);
        assert!(a.typing.is_none());
        assert!(a.tick(1000).is_empty());
        assert_eq!(a.session.world().character.pos, Position::new(0, 4));
    }

    #[test]
    fn turn_only_animates_in_place() {
        let mut a = app();
        a.select_command(index_of(ActionKind::TurnLeft));
        for k in command_for(ActionKind::TurnLeft).romaji().chars() {
            a.type_key(k, 0);
        }
        a.tick(300);
        a.tick(316);
        let frame = a.anim_frame.unwrap();
        assert_eq!(frame.position(), (0.0, 4.0));
    }

    #[test]
    fn level_select_cursor_wraps() {
        let mut a = AppState::new(&GameConfig::default(), embedded_levels());
        a.move_select_cursor(-1);
        assert_eq!(a.select_cursor, 7);
        a.move_select_cursor(1);
        assert_eq!(a.select_cursor, 0);
        a.move_select_cursor(2);
        a.confirm_level_select();
        assert_eq!(a.level_index, 2);
        assert_eq!(a.phase, Phase::Playing);

        a.open_level_select();
        assert_eq!(a.select_cursor, 2);
        a.close_level_select();
        assert_eq!(a.phase, Phase::Playing);
    }

    #[test]
    fn escape_drops_typing() {
        let mut a = app();
        a.select_command(0);
        a.type_key('m', 0);
        a.cancel_typing();
        assert!(a.typing.is_none());
        assert!(a.type_key('a', 10).is_empty());
    }
}

#![allow(missing_docs)]

use thiserror::Error;
use tracing::info;

use super::models::{Message, Role, Session, WalkStatus};

/// Default number of chat entries rendered while a walk is in progress.
pub const CHAT_WINDOW: usize = 5;

/// Every interaction the application can dispatch against a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Login { username: String, password: String },
    SignUp { username: String, password: String },
    ChooseRole(Role),
    FindWalker,
    MatchFound { partner: String },
    AcceptRequest,
    SendMessage { text: String },
    StartWalk,
    EndWalk,
    PayNow,
    Reset,
}

/// Side effects the shell carries out after a successful reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Spawn the asynchronous walker search.
    BeginSearch,
    /// Abandon any in-flight search.
    CancelSearch,
}

/// Recoverable rejections. State is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("please enter both username and password")]
    EmptyCredentials,
    #[error("log in first")]
    NotLoggedIn,
    #[error("role is already set for this session")]
    RoleAlreadyChosen,
    #[error("choose a role first")]
    NoRoleChosen,
    #[error("only a Wanderer can do that")]
    NotAWanderer,
    #[error("only a Walker can do that")]
    NotAWalker,
    #[error("already matched with a partner")]
    AlreadyMatched,
    #[error("no partner matched yet")]
    NotMatched,
    #[error("message is empty")]
    EmptyMessage,
    #[error("chat is closed once the walk is completed")]
    ChatClosed,
    #[error("walk cannot move from {} to {}", .from.label(), .to.label())]
    InvalidTransition { from: WalkStatus, to: WalkStatus },
    #[error("payment is only due after the walk is completed")]
    PaymentNotDue,
    #[error("payment has already been made")]
    AlreadyPaid,
}

/// Apply one action to the session, returning the effects the shell must
/// run. Rendering is a separate, pure projection of the resulting state.
pub fn reduce(session: &mut Session, action: Action) -> Result<Vec<Effect>, ActionError> {
    match action {
        Action::Login { username, password } | Action::SignUp { username, password } => {
            authenticate(session, username, password)?;
            Ok(Vec::new())
        }
        Action::ChooseRole(role) => {
            if !session.logged_in {
                return Err(ActionError::NotLoggedIn);
            }
            if session.role.is_some() {
                return Err(ActionError::RoleAlreadyChosen);
            }
            session.role = Some(role);
            info!(user = %session.username, role = role.label(), "role chosen");
            Ok(Vec::new())
        }
        Action::FindWalker => {
            require_role(session, Role::Wanderer)?;
            if session.matched {
                return Err(ActionError::AlreadyMatched);
            }
            Ok(vec![Effect::BeginSearch])
        }
        Action::MatchFound { partner } => {
            require_role(session, Role::Wanderer)?;
            if session.matched {
                return Err(ActionError::AlreadyMatched);
            }
            info!(user = %session.username, partner = %partner, "walker matched");
            session.matched = true;
            session.partner = Some(partner);
            Ok(Vec::new())
        }
        Action::AcceptRequest => {
            require_role(session, Role::Walker)?;
            if session.matched {
                return Err(ActionError::AlreadyMatched);
            }
            info!(user = %session.username, "walk request accepted");
            session.matched = true;
            Ok(Vec::new())
        }
        Action::SendMessage { text } => {
            if !session.matched {
                return Err(ActionError::NotMatched);
            }
            if session.walk_status == WalkStatus::Completed {
                return Err(ActionError::ChatClosed);
            }
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(ActionError::EmptyMessage);
            }
            session.messages.push(Message::local(trimmed));
            Ok(Vec::new())
        }
        Action::StartWalk => {
            advance_walk(session, WalkStatus::NotStarted, WalkStatus::InProgress)?;
            Ok(Vec::new())
        }
        Action::EndWalk => {
            advance_walk(session, WalkStatus::InProgress, WalkStatus::Completed)?;
            Ok(Vec::new())
        }
        Action::PayNow => {
            require_role(session, Role::Wanderer)?;
            if session.payment_done {
                return Err(ActionError::AlreadyPaid);
            }
            if session.walk_status != WalkStatus::Completed {
                return Err(ActionError::PaymentNotDue);
            }
            session.payment_done = true;
            info!(user = %session.username, "payment recorded");
            Ok(Vec::new())
        }
        Action::Reset => {
            info!(user = %session.username, "session reset");
            *session = session.reset();
            Ok(vec![Effect::CancelSearch])
        }
    }
}

fn authenticate(
    session: &mut Session,
    username: String,
    password: String,
) -> Result<(), ActionError> {
    // Any non-empty pair succeeds; there is no credential store.
    if username.trim().is_empty() || password.trim().is_empty() {
        return Err(ActionError::EmptyCredentials);
    }
    session.logged_in = true;
    session.username = username.trim().to_string();
    info!(user = %session.username, "logged in");
    Ok(())
}

fn require_role(session: &Session, role: Role) -> Result<(), ActionError> {
    if !session.logged_in {
        return Err(ActionError::NotLoggedIn);
    }
    match session.role {
        None => Err(ActionError::NoRoleChosen),
        Some(current) if current == role => Ok(()),
        Some(_) => Err(match role {
            Role::Wanderer => ActionError::NotAWanderer,
            Role::Walker => ActionError::NotAWalker,
        }),
    }
}

fn advance_walk(
    session: &mut Session,
    from: WalkStatus,
    to: WalkStatus,
) -> Result<(), ActionError> {
    if !session.matched {
        return Err(ActionError::NotMatched);
    }
    if session.walk_status != from {
        return Err(ActionError::InvalidTransition {
            from: session.walk_status,
            to,
        });
    }
    session.walk_status = to;
    info!(user = %session.username, status = to.label(), "walk status advanced");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::models::LOCAL_SENDER;

    fn login(session: &mut Session) {
        reduce(
            session,
            Action::Login {
                username: "alice".to_string(),
                password: "pw".to_string(),
            },
        )
        .expect("login should succeed");
    }

    fn matched_wanderer() -> Session {
        let mut session = Session::new();
        login(&mut session);
        reduce(&mut session, Action::ChooseRole(Role::Wanderer)).unwrap();
        reduce(
            &mut session,
            Action::MatchFound {
                partner: "Sarah D.".to_string(),
            },
        )
        .unwrap();
        session
    }

    #[test]
    fn wanderer_scenario_end_to_end() {
        let mut session = Session::new();

        login(&mut session);
        assert!(session.logged_in);
        assert_eq!(session.username, "alice");

        reduce(&mut session, Action::ChooseRole(Role::Wanderer)).unwrap();
        assert_eq!(session.role, Some(Role::Wanderer));

        let effects = reduce(&mut session, Action::FindWalker).unwrap();
        assert_eq!(effects, vec![Effect::BeginSearch]);
        assert!(!session.matched);

        reduce(
            &mut session,
            Action::MatchFound {
                partner: "Sarah D.".to_string(),
            },
        )
        .unwrap();
        assert!(session.matched);
        assert_eq!(session.partner.as_deref(), Some("Sarah D."));

        reduce(
            &mut session,
            Action::SendMessage {
                text: "hi".to_string(),
            },
        )
        .unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].sender, LOCAL_SENDER);
        assert_eq!(session.messages[0].text, "hi");

        reduce(&mut session, Action::StartWalk).unwrap();
        assert_eq!(session.walk_status, WalkStatus::InProgress);

        reduce(&mut session, Action::EndWalk).unwrap();
        assert_eq!(session.walk_status, WalkStatus::Completed);

        reduce(&mut session, Action::PayNow).unwrap();
        assert!(session.payment_done);
    }

    #[test]
    fn signup_behaves_like_login() {
        let mut session = Session::new();
        reduce(
            &mut session,
            Action::SignUp {
                username: "bob".to_string(),
                password: "secret".to_string(),
            },
        )
        .unwrap();
        assert!(session.logged_in);
        assert_eq!(session.username, "bob");
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let mut session = Session::new();
        let err = reduce(
            &mut session,
            Action::Login {
                username: "alice".to_string(),
                password: "   ".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err, ActionError::EmptyCredentials);
        assert!(!session.logged_in);
        assert!(session.username.is_empty());
    }

    #[test]
    fn role_choice_is_irrevocable() {
        let mut session = Session::new();
        login(&mut session);
        reduce(&mut session, Action::ChooseRole(Role::Walker)).unwrap();
        let err = reduce(&mut session, Action::ChooseRole(Role::Wanderer)).unwrap_err();
        assert_eq!(err, ActionError::RoleAlreadyChosen);
        assert_eq!(session.role, Some(Role::Walker));
    }

    #[test]
    fn walk_only_advances_forward() {
        let mut session = matched_wanderer();

        let err = reduce(&mut session, Action::EndWalk).unwrap_err();
        assert_eq!(
            err,
            ActionError::InvalidTransition {
                from: WalkStatus::NotStarted,
                to: WalkStatus::Completed,
            }
        );
        assert_eq!(session.walk_status, WalkStatus::NotStarted);

        reduce(&mut session, Action::StartWalk).unwrap();
        let err = reduce(&mut session, Action::StartWalk).unwrap_err();
        assert_eq!(
            err,
            ActionError::InvalidTransition {
                from: WalkStatus::InProgress,
                to: WalkStatus::InProgress,
            }
        );

        reduce(&mut session, Action::EndWalk).unwrap();
        let err = reduce(&mut session, Action::StartWalk).unwrap_err();
        assert_eq!(
            err,
            ActionError::InvalidTransition {
                from: WalkStatus::Completed,
                to: WalkStatus::InProgress,
            }
        );
        assert_eq!(session.walk_status, WalkStatus::Completed);
    }

    #[test]
    fn payment_requires_completed_walk_and_wanderer_role() {
        let mut session = matched_wanderer();
        let err = reduce(&mut session, Action::PayNow).unwrap_err();
        assert_eq!(err, ActionError::PaymentNotDue);
        assert!(!session.payment_done);

        reduce(&mut session, Action::StartWalk).unwrap();
        reduce(&mut session, Action::EndWalk).unwrap();
        reduce(&mut session, Action::PayNow).unwrap();
        assert!(session.payment_done);

        let err = reduce(&mut session, Action::PayNow).unwrap_err();
        assert_eq!(err, ActionError::AlreadyPaid);

        let mut walker = Session::new();
        login(&mut walker);
        reduce(&mut walker, Action::ChooseRole(Role::Walker)).unwrap();
        reduce(&mut walker, Action::AcceptRequest).unwrap();
        reduce(&mut walker, Action::StartWalk).unwrap();
        reduce(&mut walker, Action::EndWalk).unwrap();
        let err = reduce(&mut walker, Action::PayNow).unwrap_err();
        assert_eq!(err, ActionError::NotAWanderer);
        assert!(!walker.payment_done);
    }

    #[test]
    fn whitespace_messages_are_dropped() {
        let mut session = matched_wanderer();
        for text in ["", "   ", "\t\n"] {
            let err = reduce(
                &mut session,
                Action::SendMessage {
                    text: text.to_string(),
                },
            )
            .unwrap_err();
            assert_eq!(err, ActionError::EmptyMessage);
        }
        assert!(session.messages.is_empty());

        reduce(
            &mut session,
            Action::SendMessage {
                text: "  Hello  ".to_string(),
            },
        )
        .unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].text, "Hello");
    }

    #[test]
    fn chat_window_truncates_rendering_only() {
        let mut session = matched_wanderer();
        reduce(&mut session, Action::StartWalk).unwrap();
        for i in 1..=7 {
            reduce(
                &mut session,
                Action::SendMessage {
                    text: format!("message {i}"),
                },
            )
            .unwrap();
        }
        assert_eq!(session.messages.len(), 7);
        let visible = session.visible_messages(CHAT_WINDOW);
        assert_eq!(visible.len(), 5);
        assert_eq!(visible[0].text, "message 3");
        assert_eq!(visible[4].text, "message 7");
    }

    #[test]
    fn walker_match_is_instant_and_anonymous() {
        let mut session = Session::new();
        login(&mut session);
        reduce(&mut session, Action::ChooseRole(Role::Walker)).unwrap();

        let err = reduce(&mut session, Action::FindWalker).unwrap_err();
        assert_eq!(err, ActionError::NotAWanderer);

        reduce(&mut session, Action::AcceptRequest).unwrap();
        assert!(session.matched);
        assert!(session.partner.is_none());
    }

    #[test]
    fn reset_restores_every_default() {
        let mut session = matched_wanderer();
        reduce(
            &mut session,
            Action::SendMessage {
                text: "hi".to_string(),
            },
        )
        .unwrap();
        reduce(&mut session, Action::StartWalk).unwrap();
        reduce(&mut session, Action::EndWalk).unwrap();
        reduce(&mut session, Action::PayNow).unwrap();

        let effects = reduce(&mut session, Action::Reset).unwrap();
        assert_eq!(effects, vec![Effect::CancelSearch]);
        assert!(!session.logged_in);
        assert!(session.username.is_empty());
        assert_eq!(session.role, None);
        assert!(!session.matched);
        assert!(session.partner.is_none());
        assert!(session.messages.is_empty());
        assert_eq!(session.walk_status, WalkStatus::NotStarted);
        assert!(!session.payment_done);
    }

    #[test]
    fn chat_is_closed_after_completion() {
        let mut session = matched_wanderer();
        reduce(&mut session, Action::StartWalk).unwrap();
        reduce(&mut session, Action::EndWalk).unwrap();
        let err = reduce(
            &mut session,
            Action::SendMessage {
                text: "too late".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err, ActionError::ChatClosed);
        assert!(session.messages.is_empty());
    }
}

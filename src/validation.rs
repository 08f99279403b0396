//! Client-side checks run before an adjustment is sent anywhere.

use crate::errors::Rejection;
use crate::models::{Direction, PendingAdjustment, User};

/// Parses one point field as typed into a form.
pub fn parse_points(raw: &str) -> Result<u64, Rejection> {
    let value: i64 = raw.trim().parse().map_err(|_| Rejection::InvalidNumber)?;
    u64::try_from(value).map_err(|_| Rejection::InvalidNumber)
}

/// Checks requested deltas against the user's current balances and
/// computes the absolute totals to submit.
pub fn check_adjustment(
    user: &User,
    direction: Direction,
    raw_local: &str,
    raw_global: &str,
    reason: &str,
) -> Result<PendingAdjustment, Rejection> {
    let delta_local = parse_points(raw_local)?;
    let delta_global = parse_points(raw_global)?;
    let reason = reason.trim();

    let (new_local, new_global) = compute_totals(
        direction,
        user.current_local_points,
        user.current_global_points,
        delta_local,
        delta_global,
        reason,
    )?;

    Ok(PendingAdjustment {
        username: user.username.clone(),
        reason: reason.to_string(),
        delta_local,
        delta_global,
        direction,
        new_local,
        new_global,
    })
}

pub fn compute_totals(
    direction: Direction,
    current_local: u64,
    current_global: u64,
    delta_local: u64,
    delta_global: u64,
    reason: &str,
) -> Result<(u64, u64), Rejection> {
    if reason.trim().is_empty() {
        return Err(Rejection::MissingReason);
    }

    if delta_local == 0 && delta_global == 0 {
        return Err(match direction {
            Direction::Add => Rejection::NothingToAdd,
            Direction::Redeem => Rejection::NothingToRedeem,
        });
    }

    match direction {
        Direction::Add => match (
            current_local.checked_add(delta_local),
            current_global.checked_add(delta_global),
        ) {
            (Some(local), Some(global)) => Ok((local, global)),
            _ => Err(Rejection::TooManyPoints),
        },
        Direction::Redeem => {
            if delta_local > current_local || delta_global > current_global {
                return Err(Rejection::InsufficientPoints {
                    local: current_local,
                    global: current_global,
                });
            }
            Ok((current_local - delta_local, current_global - delta_global))
        }
    }
}

//! Damage procedure for fighter-squadron aggregates
//!
//! A squadron never absorbs damage itself. The hit is redirected to one
//! active member fighter chosen by hit-location index, a fresh front hit
//! location is rolled on that member, and the event re-enters the work
//! list against the member.

use std::collections::VecDeque;

use crate::core::dice::two_d6;
use crate::damage::DamageEvent;
use crate::game::Game;
use crate::report::ReportKind;
use crate::unit::location::{LocationId, AERO_AFT, AERO_LEFT_WING, AERO_NOSE, AERO_RIGHT_WING};

/// Front-column hit location for the chosen member
fn roll_member_location(roll: u32) -> LocationId {
    match roll {
        2..=6 => AERO_NOSE,
        7 => AERO_LEFT_WING,
        8 => AERO_RIGHT_WING,
        _ => AERO_AFT,
    }
}

pub fn apply(game: &mut Game, ev: DamageEvent, queue: &mut VecDeque<DamageEvent>) {
    let (round, phase) = (game.round, game.phase);
    let Some(unit) = game.units.get(&ev.target) else {
        return;
    };

    let active: Vec<_> = unit
        .squadron_members
        .iter()
        .copied()
        .filter(|m| {
            game.units
                .get(m)
                .map(|u| !u.destroyed)
                .unwrap_or(false)
        })
        .collect();

    if active.is_empty() {
        game.reports.push(round, phase, ReportKind::DamageWasted { target: ev.target, amount: ev.amount });
        return;
    }

    let member = active[ev.hit.location.0 % active.len()];
    let roll = two_d6(&mut game.rng);

    game.reports.push(
        round,
        phase,
        ReportKind::SquadronRedirect {
            squadron: ev.target,
            member,
        },
    );

    let mut follow = ev;
    follow.target = member;
    follow.hit.location = roll_member_location(roll);
    follow.hit.rear = false;
    queue.push_back(follow);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::damage::{resolve, DamageKind, HitData};
    use crate::unit::Unit;

    #[test]
    fn test_redirect_damages_a_member() {
        let mut game = Game::for_test();
        let a = Unit::aerospace("Lead", PlayerId(1));
        let b = Unit::aerospace("Wing", PlayerId(1));
        let (ida, idb) = (a.id, b.id);
        game.add_unit(a);
        game.add_unit(b);
        let squadron = Unit::squadron("Flight", PlayerId(1), vec![ida, idb]);
        let sid = squadron.id;
        game.add_unit(squadron);

        resolve(
            &mut game,
            DamageEvent::new(sid, HitData::front(LocationId(0)), 8, DamageKind::Standard),
        );

        let hit_any = [ida, idb].iter().any(|id| {
            let u = game.units.get(id).unwrap();
            u.locations.iter().any(|l| l.damage_this_phase > 0)
        });
        assert!(hit_any, "redirect should land on a member fighter");
        assert!(game
            .reports
            .iter()
            .any(|r| matches!(r.kind, ReportKind::SquadronRedirect { .. })));
    }

    #[test]
    fn test_member_choice_follows_hit_index() {
        let mut game = Game::for_test();
        let a = Unit::aerospace("Lead", PlayerId(1));
        let b = Unit::aerospace("Wing", PlayerId(1));
        let (ida, idb) = (a.id, b.id);
        game.add_unit(a);
        game.add_unit(b);
        let squadron = Unit::squadron("Flight", PlayerId(1), vec![ida, idb]);
        let sid = squadron.id;
        game.add_unit(squadron);

        resolve(
            &mut game,
            DamageEvent::new(sid, HitData::front(LocationId(1)), 6, DamageKind::Standard),
        );
        let wing = game.units.get(&idb).unwrap();
        assert!(wing.locations.iter().any(|l| l.damage_this_phase > 0));
    }

    #[test]
    fn test_dead_members_are_skipped() {
        let mut game = Game::for_test();
        let mut a = Unit::aerospace("Lead", PlayerId(1));
        a.mark_destroyed();
        let b = Unit::aerospace("Wing", PlayerId(1));
        let (ida, idb) = (a.id, b.id);
        game.add_unit(a);
        game.add_unit(b);
        let squadron = Unit::squadron("Flight", PlayerId(1), vec![ida, idb]);
        let sid = squadron.id;
        game.add_unit(squadron);

        resolve(
            &mut game,
            DamageEvent::new(sid, HitData::front(LocationId(0)), 6, DamageKind::Standard),
        );
        let wing = game.units.get(&idb).unwrap();
        assert!(wing.locations.iter().any(|l| l.damage_this_phase > 0));
    }

    #[test]
    fn test_empty_squadron_wastes_damage() {
        let mut game = Game::for_test();
        let squadron = Unit::squadron("Flight", PlayerId(1), vec![]);
        let sid = squadron.id;
        game.add_unit(squadron);

        resolve(
            &mut game,
            DamageEvent::new(sid, HitData::front(LocationId(0)), 6, DamageKind::Standard),
        );
        assert!(game
            .reports
            .iter()
            .any(|r| matches!(r.kind, ReportKind::DamageWasted { .. })));
    }
}

use chrono::NaiveTime;
use std::rc::Rc;
use weekplanner_core::model::clock::minute_time;
use weekplanner_core::service::schedule_service::SAVE_FAILED_TITLE;
use weekplanner_core::{
    MemoryPlannerRepository, MirrorService, PlannerService, QueuedNotifier, Schedule,
    ScheduleService, Task, Weekday,
};

fn at(hour: u32, minute: u32) -> NaiveTime {
    minute_time(hour, minute).unwrap()
}

fn task(name: &str, time: NaiveTime, weekday: Weekday, done: bool, priority: u8) -> Task {
    Task::new(name, "", time, done, weekday, priority).unwrap()
}

fn planner() -> (PlannerService<MemoryPlannerRepository>, Rc<QueuedNotifier>) {
    let notifier = Rc::new(QueuedNotifier::new());
    let planner = PlannerService::load(MemoryPlannerRepository::new(), notifier.clone());
    (planner, notifier)
}

fn entry_times(planner: &PlannerService<MemoryPlannerRepository>, weekday: Weekday) -> Vec<String> {
    planner
        .entries(weekday)
        .iter()
        .map(|entry| entry.time_text())
        .collect()
}

#[test]
fn operations_keep_mirror_consistent() {
    let (mut planner, notifier) = planner();
    let late = task("Read", at(21, 0), Weekday::Monday, false, 2);
    let early = task("Run", at(7, 0), Weekday::Monday, false, 5);
    let noon = task("Lunch", at(12, 0), Weekday::Monday, true, 1);

    assert!(planner.add_task(&late));
    assert!(planner.add_task(&early));
    assert!(planner.add_task(&noon));
    assert_eq!(entry_times(&planner, Weekday::Monday), vec!["07:00", "12:00", "21:00"]);
    assert!(planner.is_consistent());

    let moved = task("Lunch", at(13, 30), Weekday::Tuesday, true, 1);
    assert!(planner.edit_task(&noon, &moved));
    assert_eq!(entry_times(&planner, Weekday::Monday), vec!["07:00", "21:00"]);
    assert_eq!(entry_times(&planner, Weekday::Tuesday), vec!["13:30"]);

    assert!(planner.delete_task(&late));
    assert!(!planner.delete_task(&late));
    assert!(planner.is_consistent());
    assert!(notifier.is_empty());
}

#[test]
fn rejected_edit_leaves_both_structures_unchanged() {
    let (mut planner, _) = planner();
    let a = task("Run", at(7, 0), Weekday::Monday, false, 5);
    let blocker = task("Gym", at(9, 0), Weekday::Monday, false, 3);
    assert!(planner.add_task(&a));
    assert!(planner.add_task(&blocker));
    let before = planner.schedule().clone();

    let b = task("Swim", at(9, 0), Weekday::Monday, false, 4);
    assert!(!planner.edit_task(&a, &b));

    assert_eq!(planner.schedule(), &before);
    assert!(planner.is_consistent());
}

#[test]
fn mirror_failure_undoes_schedule_add() {
    let notifier = Rc::new(QueuedNotifier::new());
    let stale = task("Stale", at(8, 0), Weekday::Friday, false, 2);
    let mirror = MirrorService::from_schedule(
        &Schedule::from_tasks([stale]).unwrap(),
        notifier.clone(),
    );
    let engine = ScheduleService::load(MemoryPlannerRepository::new(), notifier.clone());
    let mut planner = PlannerService::from_parts(engine, mirror, notifier.clone());
    assert!(!planner.is_consistent());

    let fresh = task("Fresh", at(8, 0), Weekday::Friday, false, 4);
    assert!(!planner.add_task(&fresh));

    assert!(!planner.engine().is_task_in_schedule(&fresh));
    assert!(planner.schedule().is_empty());
    assert!(notifier.is_empty());
}

#[test]
fn mirror_failure_on_delete_restores_schedule_entry() {
    let notifier = Rc::new(QueuedNotifier::new());
    let kept = task("Kept", at(10, 0), Weekday::Sunday, false, 6);
    let engine = ScheduleService::with_schedule(
        MemoryPlannerRepository::new(),
        Schedule::from_tasks([kept.clone()]).unwrap(),
        notifier.clone(),
    );
    let mirror = MirrorService::from_schedule(&Schedule::new(), notifier.clone());
    let mut planner = PlannerService::from_parts(engine, mirror, notifier.clone());

    assert!(!planner.delete_task(&kept));
    assert!(planner.engine().is_task_in_schedule(&kept));
    assert!(notifier.is_empty());
}

#[test]
fn mirror_failure_on_edit_reverses_schedule_edit() {
    let notifier = Rc::new(QueuedNotifier::new());
    let old = task("Old", at(6, 0), Weekday::Thursday, false, 3);
    let new = task("New", at(7, 0), Weekday::Thursday, false, 3);
    let blocker = task("Blocker", at(7, 0), Weekday::Thursday, false, 1);
    let engine = ScheduleService::with_schedule(
        MemoryPlannerRepository::new(),
        Schedule::from_tasks([old.clone()]).unwrap(),
        notifier.clone(),
    );
    let mirror = MirrorService::from_schedule(
        &Schedule::from_tasks([old.clone(), blocker]).unwrap(),
        notifier.clone(),
    );
    let mut planner = PlannerService::from_parts(engine, mirror, notifier.clone());

    assert!(!planner.edit_task(&old, &new));

    assert!(planner.engine().is_task_in_schedule(&old));
    assert!(!planner.engine().is_task_in_schedule(&new));
    assert!(planner.mirror().is_represented(&old));
    assert!(notifier.is_empty());
}

#[test]
fn bulk_operations_count_changed_tasks() {
    let (mut planner, _) = planner();
    let tasks = [
        task("a", at(6, 0), Weekday::Monday, true, 3),
        task("b", at(7, 0), Weekday::Monday, false, 5),
        task("c", at(8, 0), Weekday::Tuesday, true, 8),
        task("d", at(9, 0), Weekday::Sunday, true, 2),
    ];
    for task in &tasks {
        assert!(planner.add_task(task));
    }

    assert_eq!(planner.reset_points(&[Weekday::Monday, Weekday::Tuesday]), 2);
    assert_eq!(planner.engine().points_earned(Weekday::Monday), 0);
    assert_eq!(planner.engine().points_earned(Weekday::Sunday), 2);
    assert_eq!(planner.entries(Weekday::Tuesday)[0].label(), "c(0/8)");

    assert_eq!(planner.clear_weekdays(&[Weekday::Monday, Weekday::Sunday]), 3);
    assert_eq!(planner.schedule().len(), 1);
    assert!(planner.is_consistent());
}

#[test]
fn selection_helpers_use_stored_task() {
    let (mut planner, _) = planner();
    let gym = task("Gym", at(18, 0), Weekday::Wednesday, false, 7);
    assert!(planner.add_task(&gym));

    assert!(planner.set_done(Weekday::Wednesday, at(18, 0), true));
    assert!(!planner.set_done(Weekday::Wednesday, at(18, 0), true));
    assert_eq!(planner.engine().points_earned(Weekday::Wednesday), 7);
    assert_eq!(planner.entries(Weekday::Wednesday)[0].label(), "Gym(7/7)");

    assert!(!planner.delete_selected(Weekday::Wednesday, at(19, 0)));
    assert!(planner.delete_selected(Weekday::Wednesday, at(18, 0)));
    assert!(planner.schedule().is_empty());
    assert!(planner.mirror().is_empty());
}

#[test]
fn save_and_reload_round_trip_through_gateway() {
    let repo = MemoryPlannerRepository::new();
    let notifier = Rc::new(QueuedNotifier::new());
    let mut planner = PlannerService::load(&repo, notifier.clone());
    let run = task("Run", at(7, 0), Weekday::Monday, true, 5);
    assert!(planner.add_task(&run));
    assert!(planner.save());
    assert_eq!(repo.save_count(), 1);
    assert_eq!(repo.stored_schedule().as_ref(), Some(planner.schedule()));

    assert!(planner.delete_task(&run));
    assert!(planner.reload());
    assert!(planner.engine().is_task_in_schedule(&run));
    assert!(planner.is_consistent());

    repo.set_fail_saves(true);
    assert!(!planner.save());
    let drained = notifier.drain();
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].title, SAVE_FAILED_TITLE);
}

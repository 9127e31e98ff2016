use common::{AcquiredBonus, DISLIKE_SENTINEL, Evaluation, ScoreState, SolutionData};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};
use server::entity::{solution, solution_blob};
use server::error::AppError;
use server::models::{NewProblem, NewSolution, SubmittedSolution};

use crate::support::{TestLedger, square_problem, square_solution};

#[tokio::test]
async fn resubmitting_identical_content_returns_the_same_id() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;

    let first = ledger
        .catalog
        .add_solution(NewSolution::new(1, square_solution(0)))
        .await
        .unwrap();
    assert_eq!(first.solution_id, 1);
    assert!(!first.deduplicated);

    let second = ledger
        .catalog
        .add_solution(NewSolution::new(1, square_solution(0)).with_tags(["retry"]))
        .await
        .unwrap();
    assert_eq!(second.solution_id, 1);
    assert!(second.deduplicated);

    let db = ledger.catalog.connection();
    assert_eq!(solution::Entity::find().count(db).await.unwrap(), 1);
    assert_eq!(solution_blob::Entity::find().count(db).await.unwrap(), 1);
    assert_eq!(ledger.blob_count("solutions"), 1);

    // A deduplicated call writes nothing, tags included.
    let stored = ledger.catalog.get_solution(1).await.unwrap();
    assert!(stored.tags.is_empty());
    assert_eq!(stored.state(), ScoreState::Unscored);
    assert_eq!(stored.dislike, DISLIKE_SENTINEL);
}

#[tokio::test]
async fn key_order_and_whitespace_do_not_create_new_rows() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;

    let compact = SolutionData::from_json(
        br#"{"vertices":[[1,1],[2,1],[2,2],[1,2]],"bonuses":[{"bonus":"GLOBALIST","problem":2}]}"#,
    )
    .unwrap();
    let spaced = SolutionData::from_json(
        br#"{
            "bonuses": [ { "problem": 2, "bonus": "GLOBALIST" } ],
            "vertices": [ [1, 1], [2, 1], [2, 2], [1, 2] ]
        }"#,
    )
    .unwrap();

    let a = ledger
        .catalog
        .add_solution(NewSolution::new(1, compact))
        .await
        .unwrap();
    let b = ledger
        .catalog
        .add_solution(NewSolution::new(1, spaced))
        .await
        .unwrap();

    assert_eq!(a.solution_id, b.solution_id);
    assert!(b.deduplicated);
    assert_eq!(ledger.blob_count("solutions"), 1);
}

#[tokio::test]
async fn same_payload_on_two_problems_shares_one_blob() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;
    ledger.with_square(2).await;

    let a = ledger
        .catalog
        .add_solution(NewSolution::new(1, square_solution(3)))
        .await
        .unwrap();
    let b = ledger
        .catalog
        .add_solution(NewSolution::new(2, square_solution(3)))
        .await
        .unwrap();

    assert_ne!(a.solution_id, b.solution_id);
    assert!(!b.deduplicated);
    assert_eq!(ledger.blob_count("solutions"), 1);

    let db = ledger.catalog.connection();
    assert_eq!(solution_blob::Entity::find().count(db).await.unwrap(), 1);

    let first = ledger.catalog.get_solution(a.solution_id).await.unwrap();
    let second = ledger.catalog.get_solution(b.solution_id).await.unwrap();
    assert_eq!(first.content_hash, second.content_hash);
}

#[tokio::test]
async fn vertex_count_mismatch_writes_nothing() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;

    let triangle = SolutionData {
        vertices: vec![(0, 0), (1, 0), (1, 1)],
        bonuses: None,
    };
    let err = ledger
        .catalog
        .add_solution(NewSolution::new(1, triangle).with_tags(["bad"]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let db = ledger.catalog.connection();
    assert_eq!(solution::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(ledger.blob_count("solutions"), 0);
}

#[tokio::test]
async fn solution_for_unknown_problem_is_not_found() {
    let ledger = TestLedger::new().await;

    let err = ledger
        .catalog
        .add_solution(NewSolution::new(9, square_solution(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(ledger.blob_count("solutions"), 0);
}

#[tokio::test]
async fn failing_tag_insert_rolls_back_the_solution() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;

    ledger
        .catalog
        .connection()
        .execute_unprepared(
            "CREATE TRIGGER reject_boom BEFORE INSERT ON solution_tag \
             WHEN NEW.tag = 'boom' BEGIN SELECT RAISE(ABORT, 'tag rejected'); END;",
        )
        .await
        .unwrap();

    let err = ledger
        .catalog
        .add_solution(NewSolution::new(1, square_solution(0)).with_tags(["ok", "boom"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));

    assert!(matches!(
        ledger.catalog.get_solution(1).await,
        Err(AppError::NotFound(_))
    ));
    assert!(
        ledger
            .catalog
            .get_solutions_for_problem(1)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        ledger
            .catalog
            .get_solutions_for_tag("ok")
            .await
            .unwrap()
            .is_empty()
    );

    // The rolled-back attempt does not block a clean retry.
    let added = ledger
        .catalog
        .add_solution(NewSolution::new(1, square_solution(0)).with_tags(["ok"]))
        .await
        .unwrap();
    assert!(!added.deduplicated);
    let stored = ledger.catalog.get_solution(added.solution_id).await.unwrap();
    assert_eq!(stored.tags, vec!["ok"]);
}

#[tokio::test]
async fn initial_evaluation_is_stored_with_the_row() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;

    let bonus = AcquiredBonus {
        bonus: "GLOBALIST".into(),
        problem: 2,
    };
    let added = ledger
        .catalog
        .add_solution(
            NewSolution::new(1, square_solution(0))
                .with_evaluation(Evaluation::scored(42, vec![bonus.clone()])),
        )
        .await
        .unwrap();

    let stored = ledger.catalog.get_solution(added.solution_id).await.unwrap();
    assert_eq!(stored.state(), ScoreState::Scored);
    assert_eq!(stored.dislike, 42);
    assert_eq!(stored.acquired_bonuses, vec![bonus]);
}

#[tokio::test]
async fn explicit_and_default_creation_times() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;

    let dated = ledger
        .catalog
        .add_solution(NewSolution::new(1, square_solution(0)).created_at(1_625_000_000))
        .await
        .unwrap();
    let undated = ledger
        .catalog
        .add_solution(NewSolution::new(1, square_solution(1)).created_at(0))
        .await
        .unwrap();

    let dated = ledger.catalog.get_solution(dated.solution_id).await.unwrap();
    let undated = ledger.catalog.get_solution(undated.solution_id).await.unwrap();
    assert_eq!(dated.created_at, 1_625_000_000);
    assert!(undated.created_at > 1_625_000_000);
}

#[tokio::test]
async fn problem_round_trips_with_defaults() {
    let ledger = TestLedger::new().await;

    let added = ledger
        .catalog
        .add_problem(NewProblem::new(7, square_problem()))
        .await
        .unwrap();
    assert_eq!(added.minimal_dislike, DISLIKE_SENTINEL);
    assert!(added.created_at > 0);

    let stored = ledger.catalog.get_problem(7).await.unwrap();
    assert_eq!(stored, added);
    assert!(ledger.blob_dir("problems").join("7.json").exists());
}

#[tokio::test]
async fn duplicate_problem_keeps_the_original_document() {
    let ledger = TestLedger::new().await;
    ledger
        .catalog
        .add_problem(
            NewProblem::new(1, square_problem())
                .created_at(1_625_000_000)
                .minimal_dislike(120),
        )
        .await
        .unwrap();

    let mut other = square_problem();
    other.epsilon = 0;
    let err = ledger
        .catalog
        .add_problem(NewProblem::new(1, other))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyExists(_)));
    assert_eq!(err.code(), "ALREADY_EXISTS");

    let stored = ledger.catalog.get_problem(1).await.unwrap();
    assert_eq!(stored.data, square_problem());
    assert_eq!(stored.created_at, 1_625_000_000);
    assert_eq!(stored.minimal_dislike, 120);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_problem_inserts_keep_the_winners_document() {
    let ledger = TestLedger::new().await;

    let mut handles = Vec::new();
    for epsilon in 0..8 {
        let catalog = ledger.catalog.clone();
        let mut data = square_problem();
        data.epsilon = epsilon;
        handles.push(tokio::spawn(async move {
            (epsilon, catalog.add_problem(NewProblem::new(1, data)).await)
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            (epsilon, Ok(_)) => winners.push(epsilon),
            (_, Err(e)) => assert!(matches!(e, AppError::AlreadyExists(_)), "{e}"),
        }
    }
    assert_eq!(winners.len(), 1);

    let stored = ledger.catalog.get_problem(1).await.unwrap();
    assert_eq!(stored.data.epsilon, winners[0]);
    assert_eq!(ledger.blob_count("problems"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_submissions_share_one_row() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let catalog = ledger.catalog.clone();
        handles.push(tokio::spawn(async move {
            catalog
                .add_solution(NewSolution::new(1, square_solution(0)))
                .await
        }));
    }

    let mut ids = Vec::new();
    let mut fresh = 0;
    for handle in handles {
        let added = handle.await.unwrap().unwrap();
        ids.push(added.solution_id);
        if !added.deduplicated {
            fresh += 1;
        }
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(fresh, 1);

    let db = ledger.catalog.connection();
    assert_eq!(solution::Entity::find().count(db).await.unwrap(), 1);
    assert_eq!(ledger.catalog.pending_evaluations().await.unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_problem_writes_nothing() {
    let ledger = TestLedger::new().await;

    let mut problem = square_problem();
    problem.figure.edges.push((0, 9));
    let err = ledger
        .catalog
        .add_problem(NewProblem::new(1, problem))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(ledger.blob_count("problems"), 0);
    assert!(matches!(
        ledger.catalog.get_problem(1).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn minimal_dislike_is_overwritten() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;

    ledger.catalog.update_minimal_dislike(1, 77).await.unwrap();
    assert_eq!(ledger.catalog.get_problem(1).await.unwrap().minimal_dislike, 77);

    assert!(matches!(
        ledger.catalog.update_minimal_dislike(2, 77).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn tags_behave_as_a_set() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;

    let added = ledger
        .catalog
        .add_solution(
            NewSolution::new(1, square_solution(0)).with_tags(["manual", " manual ", "", "best"]),
        )
        .await
        .unwrap();
    let id = added.solution_id;
    assert_eq!(
        ledger.catalog.get_solution(id).await.unwrap().tags,
        vec!["best", "manual"]
    );

    ledger.catalog.add_solution_tag(id, "annealed").await.unwrap();
    ledger.catalog.add_solution_tag(id, "annealed").await.unwrap();
    ledger.catalog.remove_solution_tag(id, "manual").await.unwrap();
    ledger.catalog.remove_solution_tag(id, "manual").await.unwrap();
    ledger.catalog.remove_solution_tag(id, "never-added").await.unwrap();

    assert_eq!(
        ledger.catalog.get_solution(id).await.unwrap().tags,
        vec!["annealed", "best"]
    );
}

#[tokio::test]
async fn tag_mutation_checks_its_inputs() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;
    let id = ledger
        .catalog
        .add_solution(NewSolution::new(1, square_solution(0)))
        .await
        .unwrap()
        .solution_id;

    assert!(matches!(
        ledger.catalog.add_solution_tag(id, "  ").await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        ledger.catalog.remove_solution_tag(id, "").await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        ledger.catalog.add_solution_tag(404, "x").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        ledger.catalog.remove_solution_tag(404, "x").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn evaluation_result_overwrites_previous_verdict() {
    let ledger = TestLedger::new().await;
    ledger.with_square(1).await;
    let id = ledger
        .catalog
        .add_solution(NewSolution::new(1, square_solution(0)))
        .await
        .unwrap()
        .solution_id;

    ledger
        .catalog
        .update_solution_eval_result(id, &Evaluation::rejected("figure escapes hole"))
        .await
        .unwrap();
    let stored = ledger.catalog.get_solution(id).await.unwrap();
    assert_eq!(stored.state(), ScoreState::Rejected);
    assert_eq!(stored.reject_reason, "figure escapes hole");

    ledger
        .catalog
        .update_solution_eval_result(id, &Evaluation::scored(12, vec![]))
        .await
        .unwrap();
    let stored = ledger.catalog.get_solution(id).await.unwrap();
    assert_eq!(stored.state(), ScoreState::Scored);
    assert_eq!(stored.dislike, 12);
    assert!(stored.reject_reason.is_empty());

    assert!(matches!(
        ledger
            .catalog
            .update_solution_eval_result(404, &Evaluation::scored(1, vec![]))
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn missing_solution_is_not_found() {
    let ledger = TestLedger::new().await;
    let err = ledger.catalog.get_solution(1).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn submitted_solutions_are_unique_by_external_id() {
    let ledger = TestLedger::new().await;
    assert!(ledger.catalog.get_submitted_solutions().await.unwrap().is_empty());

    let record = SubmittedSolution {
        submitted_solution_id: "6f1c2a".into(),
        problem_id: 1,
        solution_id: 1,
        created_at: 1_625_000_000,
    };
    ledger
        .catalog
        .add_submitted_solution(record.clone())
        .await
        .unwrap();

    let err = ledger
        .catalog
        .add_submitted_solution(record.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyExists(_)));

    let invalid = SubmittedSolution {
        submitted_solution_id: "7a".into(),
        solution_id: 0,
        ..record.clone()
    };
    assert!(matches!(
        ledger.catalog.add_submitted_solution(invalid).await,
        Err(AppError::Validation(_))
    ));

    assert_eq!(
        ledger.catalog.get_submitted_solutions().await.unwrap(),
        vec![record]
    );
}

#[tokio::test]
async fn running_tasks_are_recorded() {
    let ledger = TestLedger::new().await;
    assert!(ledger.catalog.get_running_tasks().await.unwrap().is_empty());

    let task = ledger.catalog.add_running_task(31, 1).await.unwrap();
    assert!(task.created_at > 0);
    ledger.catalog.add_running_task(30, 2).await.unwrap();

    assert!(matches!(
        ledger.catalog.add_running_task(31, 1).await,
        Err(AppError::AlreadyExists(_))
    ));

    let tasks = ledger.catalog.get_running_tasks().await.unwrap();
    let ids: Vec<i64> = tasks.iter().map(|t| t.task_id).collect();
    assert_eq!(ids, vec![30, 31]);
    assert_eq!(tasks[1], task);
}

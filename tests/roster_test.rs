// ==========================================
// 学生/教师资料管理测试
// ==========================================


#[cfg(test)]
mod roster_test {
    use language_school::domain::{
        CounterEntity, Gender, Level, PersonStatus, Shift, StudentDraft, StudentUpdate, TeacherDraft,
        TeacherUpdate,
    };
    use language_school::engine::{EngineError, RuleViolation};
    use language_school::repository::RepositoryError;

    use crate::test_helpers::*;

    fn rule(err: EngineError) -> RuleViolation {
        match err {
            EngineError::Rule(v) => v,
            other => panic!("Expected rule violation, got {:?}", other),
        }
    }

    fn student_draft(name: &str) -> StudentDraft {
        StudentDraft {
            name: name.to_string(),
            birth_date: date(2004, 9, 12),
            gender: Gender::Male,
        }
    }

    fn teacher_draft(name: &str, email: &str) -> TeacherDraft {
        TeacherDraft {
            name: name.to_string(),
            email: email.to_string(),
            birth_date: date(1975, 2, 3),
            gender: Gender::Female,
        }
    }

    // ==========================================
    // 学生
    // ==========================================

    #[tokio::test]
    async fn test_add_student_normalizes_and_rejects_duplicate() {
        let env = setup_env();
        let student = env.roster.add_student(student_draft("  joao  pedro ")).await.unwrap();
        assert_eq!(student.name, "Joao Pedro");
        assert_eq!(student.status, PersonStatus::Active);
        assert_eq!(student.enrolled_course_count, 0);

        let err = env.roster.add_student(student_draft("JOAO PEDRO")).await.unwrap_err();
        assert_eq!(
            rule(err),
            RuleViolation::DuplicateStudent {
                existing_student_id: student.student_id
            }
        );
    }

    #[tokio::test]
    async fn test_add_student_rejects_invalid_fields() {
        let env = setup_env();

        let err = env.roster.add_student(student_draft("R2 D2")).await.unwrap_err();
        assert!(matches!(rule(err), RuleViolation::InvalidField { ref field, .. } if field == "name"));

        let mut draft = student_draft("Old Timer");
        draft.birth_date = date(1930, 1, 1);
        let err = env.roster.add_student(draft).await.unwrap_err();
        assert!(matches!(
            rule(err),
            RuleViolation::InvalidField { ref field, .. } if field == "birth_date"
        ));
    }

    #[tokio::test]
    async fn test_update_student_keeps_counter() {
        let env = setup_env();
        let student = env.roster.add_student(student_draft("Quinn")).await.unwrap();
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);
        env.rules.enroll_student(student.student_id, course).await.unwrap();

        let update = StudentUpdate {
            name: "quinn rocha".to_string(),
            birth_date: student.birth_date,
            gender: Gender::Other,
            status: PersonStatus::Active,
        };
        let updated = env.roster.update_student(student.student_id, update).await.unwrap();

        assert_eq!(updated.name, "Quinn Rocha");
        assert_eq!(updated.gender, Gender::Other);
        assert_eq!(updated.enrolled_course_count, 1);
    }

    #[tokio::test]
    async fn test_remove_student_unenrolls_everywhere() {
        let env = setup_env();
        let student = env.roster.add_student(student_draft("Rui")).await.unwrap();
        let japanese = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);
        let korean = insert_course(&env.store, "Korean", Shift::Morning, Level::Beginner, 10);
        env.rules.enroll_student(student.student_id, japanese).await.unwrap();
        env.rules.enroll_student(student.student_id, korean).await.unwrap();

        let released = env.roster.remove_student(student.student_id).await.unwrap();
        assert_eq!(released.len(), 2);
        assert_eq!(read_course(&env.store, japanese).enrolled_student_count, 0);
        assert_eq!(read_course(&env.store, korean).enrolled_student_count, 0);
        assert_eq!(enrollment_rows(&env.store, japanese), 0);

        let err = env.roster.remove_student(student.student_id).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    // ==========================================
    // 教师
    // ==========================================

    #[tokio::test]
    async fn test_add_teacher_lowercases_email_and_rejects_duplicate() {
        let env = setup_env();
        let teacher = env
            .roster
            .add_teacher(teacher_draft("sofia nunes", "Sofia.Nunes@School.TEST"))
            .await
            .unwrap();
        assert_eq!(teacher.name, "Sofia Nunes");
        assert_eq!(teacher.email, "sofia.nunes@school.test");

        let err = env
            .roster
            .add_teacher(teacher_draft("Sofia Nunes", "sofia.nunes@school.test"))
            .await
            .unwrap_err();
        assert_eq!(
            rule(err),
            RuleViolation::DuplicateTeacher {
                existing_teacher_id: teacher.teacher_id
            }
        );

        let err = env
            .roster
            .add_teacher(teacher_draft("Tom", "not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(rule(err), RuleViolation::InvalidField { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_deactivating_teacher_releases_courses() {
        let env = setup_env();
        let teacher = env
            .roster
            .add_teacher(teacher_draft("Ursula", "ursula@school.test"))
            .await
            .unwrap();
        let japanese = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);
        let korean = insert_course(&env.store, "Korean", Shift::Morning, Level::Beginner, 10);
        env.rules.assign_teacher(japanese, teacher.teacher_id).await.unwrap();
        env.rules.assign_teacher(korean, teacher.teacher_id).await.unwrap();

        let update = TeacherUpdate {
            name: teacher.name.clone(),
            email: teacher.email.clone(),
            birth_date: teacher.birth_date,
            gender: teacher.gender,
            status: PersonStatus::Inactive,
        };
        let outcome = env.roster.update_teacher(teacher.teacher_id, update).await.unwrap();

        assert_eq!(outcome.teacher.status, PersonStatus::Inactive);
        assert_eq!(outcome.teacher.assigned_course_count, 0);
        assert_eq!(outcome.released_courses.len(), 2);
        assert_eq!(read_course(&env.store, japanese).teacher_id, None);
        assert_eq!(read_course(&env.store, korean).teacher_id, None);
    }

    #[tokio::test]
    async fn test_remove_teacher_with_courses_is_rejected() {
        let env = setup_env();
        let teacher = env
            .roster
            .add_teacher(teacher_draft("Vera", "vera@school.test"))
            .await
            .unwrap();
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);
        env.rules.assign_teacher(course, teacher.teacher_id).await.unwrap();

        let err = env.roster.remove_teacher(teacher.teacher_id).await.unwrap_err();
        assert_eq!(
            rule(err),
            RuleViolation::TeacherHasCourses {
                teacher_id: teacher.teacher_id,
                course_count: 1
            }
        );

        env.rules.unassign_teacher(course).await.unwrap();
        env.roster.remove_teacher(teacher.teacher_id).await.unwrap();
    }

    // ==========================================
    // 计数对账
    // ==========================================

    #[tokio::test]
    async fn test_audit_and_reconcile_counters() {
        let env = setup_env();
        let student = insert_student(&env.store, "Wagner");
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);
        env.rules.enroll_student(student, course).await.unwrap();
        assert!(env.roster.audit_counters().await.unwrap().is_empty());

        force_student_count(&env.store, student, 3);
        let drift = env.roster.audit_counters().await.unwrap();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].entity, CounterEntity::Student);
        assert_eq!(drift[0].cached, 3);
        assert_eq!(drift[0].actual, 1);

        let fixed = env.roster.reconcile_counters().await.unwrap();
        assert_eq!(fixed.len(), 1);
        assert_eq!(read_student(&env.store, student).enrolled_course_count, 1);
        assert!(env.roster.audit_counters().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_rewrites_course_and_teacher_counters() {
        let env = setup_env();
        let teacher = insert_teacher(&env.store, "Xenia");
        let course = insert_course(&env.store, "Korean", Shift::Evening, Level::Advanced, 10);
        env.rules.assign_teacher(course, teacher).await.unwrap();

        force_teacher_count(&env.store, teacher, 0);
        env.store
            .unit_of_work(|conn| {
                conn.execute(
                    "UPDATE course SET enrolled_student_count = 4 WHERE course_id = ?1",
                    [course],
                )
                .map_err(RepositoryError::from)
            })
            .unwrap();

        let mut entities: Vec<_> = env
            .roster
            .reconcile_counters()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.entity)
            .collect();
        entities.sort_by_key(|e| e.to_db_str());
        assert_eq!(entities, vec![CounterEntity::Course, CounterEntity::Teacher]);

        assert_eq!(read_teacher(&env.store, teacher).assigned_course_count, 1);
        assert_eq!(read_course(&env.store, course).enrolled_student_count, 0);
        assert!(env.roster.audit_counters().await.unwrap().is_empty());
    }
}

// ==========================================
// 选课规则引擎测试
// ==========================================
// 职责: 验证选课/退课、教师分配/解除的规则顺序与计数同步
// ==========================================


#[cfg(test)]
mod enrollment_engine_test {
    use language_school::domain::{CourseStatus, Level, PersonStatus, Shift};
    use language_school::engine::{AssignmentOutcome, EngineError, RuleViolation};
    use language_school::repository::{CourseRepository, RepositoryError, StudentRepository};
    use rusqlite::params;

    use crate::test_helpers::*;

    fn rule(err: EngineError) -> RuleViolation {
        match err {
            EngineError::Rule(v) => v,
            other => panic!("Expected rule violation, got {:?}", other),
        }
    }

    // ==========================================
    // EnrollStudent
    // ==========================================

    #[tokio::test]
    async fn test_enroll_increments_both_counters() {
        let env = setup_env();
        let student = insert_student(&env.store, "Ana Clara");
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);

        let enrollment = env.rules.enroll_student(student, course).await.unwrap();
        assert_eq!(enrollment.student_id, student);
        assert_eq!(enrollment.course_id, course);

        assert_eq!(read_student(&env.store, student).enrolled_course_count, 1);
        assert_eq!(read_course(&env.store, course).enrolled_student_count, 1);
        assert_eq!(enrollment_rows(&env.store, course), 1);
    }

    #[tokio::test]
    async fn test_second_enroll_is_rejected_as_already_enrolled() {
        let env = setup_env();
        let student = insert_student(&env.store, "Ana Clara");
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);

        env.rules.enroll_student(student, course).await.unwrap();
        let err = env.rules.enroll_student(student, course).await.unwrap_err();

        assert_eq!(
            rule(err),
            RuleViolation::AlreadyEnrolled {
                student_id: student,
                course_id: course
            }
        );
        assert_eq!(read_student(&env.store, student).enrolled_course_count, 1);
        assert_eq!(read_course(&env.store, course).enrolled_student_count, 1);
    }

    #[tokio::test]
    async fn test_student_quota_boundary() {
        let env = setup_env();
        let student = insert_student(&env.store, "Bruno");
        let courses = [
            insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10),
            insert_course(&env.store, "Korean", Shift::Morning, Level::Beginner, 10),
            insert_course(&env.store, "German", Shift::Morning, Level::Beginner, 10),
        ];
        let fourth = insert_course(&env.store, "Italian", Shift::Evening, Level::Advanced, 10);

        for course in courses {
            env.rules.enroll_student(student, course).await.unwrap();
        }
        assert_eq!(read_student(&env.store, student).enrolled_course_count, 3);

        let err = env.rules.enroll_student(student, fourth).await.unwrap_err();
        assert_eq!(
            rule(err),
            RuleViolation::StudentQuotaExceeded {
                student_id: student,
                limit: 3
            }
        );
        assert_eq!(read_course(&env.store, fourth).enrolled_student_count, 0);
    }

    #[tokio::test]
    async fn test_language_exclusivity_ignores_case() {
        let env = setup_env();
        let student = insert_student(&env.store, "Carla");
        let spanish = insert_course(&env.store, "Spanish", Shift::Morning, Level::Beginner, 10);
        let spanish_lower =
            insert_course(&env.store, "spanish", Shift::Evening, Level::Intermediate, 10);
        let portuguese = insert_course(&env.store, "Portuguese", Shift::Morning, Level::Beginner, 10);

        env.rules.enroll_student(student, spanish).await.unwrap();

        let err = env.rules.enroll_student(student, spanish_lower).await.unwrap_err();
        match rule(err) {
            RuleViolation::DuplicateLanguage {
                student_id,
                existing_course_id,
                ..
            } => {
                assert_eq!(student_id, student);
                assert_eq!(existing_course_id, spanish);
            }
            other => panic!("Expected DuplicateLanguage, got {:?}", other),
        }

        env.rules.enroll_student(student, portuguese).await.unwrap();
        assert_eq!(read_student(&env.store, student).enrolled_course_count, 2);
    }

    #[tokio::test]
    async fn test_full_course_accepts_exactly_one_after_unenroll() {
        let env = setup_env();
        let course = insert_course(&env.store, "Japanese", Shift::Afternoon, Level::Beginner, 10);
        let students = insert_students(&env.store, 10);
        for &s in &students {
            env.rules.enroll_student(s, course).await.unwrap();
        }
        assert_eq!(read_course(&env.store, course).enrolled_student_count, 10);

        let latecomer = insert_student(&env.store, "Late Comer");
        let another = insert_student(&env.store, "Another One");

        let err = env.rules.enroll_student(latecomer, course).await.unwrap_err();
        assert_eq!(
            rule(err),
            RuleViolation::CourseFull {
                course_id: course,
                max_students: 10
            }
        );

        env.rules.unenroll_student(students[0], course).await.unwrap();
        assert_eq!(read_course(&env.store, course).enrolled_student_count, 9);
        assert_eq!(read_student(&env.store, students[0]).enrolled_course_count, 0);

        env.rules.enroll_student(latecomer, course).await.unwrap();
        assert_eq!(read_course(&env.store, course).enrolled_student_count, 10);

        let err = env.rules.enroll_student(another, course).await.unwrap_err();
        assert!(matches!(rule(err), RuleViolation::CourseFull { .. }));
    }

    #[tokio::test]
    async fn test_course_full_checked_before_already_enrolled() {
        let env = setup_env();
        let course = insert_course(&env.store, "Japanese", Shift::Afternoon, Level::Beginner, 10);
        let students = insert_students(&env.store, 10);
        for &s in &students {
            env.rules.enroll_student(s, course).await.unwrap();
        }

        let err = env.rules.enroll_student(students[3], course).await.unwrap_err();
        assert!(matches!(rule(err), RuleViolation::CourseFull { .. }));
    }

    #[tokio::test]
    async fn test_enroll_missing_entities_is_not_found() {
        let env = setup_env();
        let student = insert_student(&env.store, "Dora");
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);

        let err = env.rules.enroll_student(999, course).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { ref entity, .. } if entity == "Student"));
        assert!(!err.is_rule_violation());

        let err = env.rules.enroll_student(student, 999).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { ref entity, .. } if entity == "Course"));
    }

    #[tokio::test]
    async fn test_enroll_rejects_inactive_course_and_student() {
        let env = setup_env();
        let student = insert_student(&env.store, "Eva");
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);

        env.store
            .unit_of_work(|conn| {
                conn.execute(
                    "UPDATE course SET status = ?1 WHERE course_id = ?2",
                    params![CourseStatus::Completed.to_db_str(), course],
                )
                .map_err(RepositoryError::from)
            })
            .unwrap();
        let err = env.rules.enroll_student(student, course).await.unwrap_err();
        assert_eq!(
            rule(err),
            RuleViolation::CourseNotActive {
                course_id: course,
                status: CourseStatus::Completed
            }
        );

        let open_course = insert_course(&env.store, "Korean", Shift::Morning, Level::Beginner, 10);
        env.store
            .unit_of_work(|conn| {
                conn.execute(
                    "UPDATE student SET status = ?1 WHERE student_id = ?2",
                    params![PersonStatus::Inactive.to_db_str(), student],
                )
                .map_err(RepositoryError::from)
            })
            .unwrap();
        let err = env.rules.enroll_student(student, open_course).await.unwrap_err();
        assert_eq!(rule(err), RuleViolation::StudentInactive { student_id: student });
    }

    // ==========================================
    // UnenrollStudent
    // ==========================================

    #[tokio::test]
    async fn test_unenroll_without_enrollment_is_not_enrolled() {
        let env = setup_env();
        let student = insert_student(&env.store, "Fabio");
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);

        let err = env.rules.unenroll_student(student, course).await.unwrap_err();
        assert_eq!(
            rule(err),
            RuleViolation::NotEnrolled {
                student_id: student,
                course_id: course
            }
        );
    }

    #[tokio::test]
    async fn test_unenroll_floors_counters_at_zero() {
        let env = setup_env();
        let student = insert_student(&env.store, "Gil");
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);
        env.rules.enroll_student(student, course).await.unwrap();

        // 人为把缓存计数改成 0, 退课后仍不得为负
        force_student_count(&env.store, student, 0);
        env.rules.unenroll_student(student, course).await.unwrap();

        assert_eq!(read_student(&env.store, student).enrolled_course_count, 0);
        assert_eq!(read_course(&env.store, course).enrolled_student_count, 0);
    }

    // ==========================================
    // AssignTeacher / UnassignTeacher
    // ==========================================

    #[tokio::test]
    async fn test_teacher_quota_exceeded_on_fourth_course() {
        let env = setup_env();
        let teacher = insert_teacher(&env.store, "Helena Costa");
        let languages = ["Japanese", "Korean", "German", "Italian"];
        let courses: Vec<_> = languages
            .iter()
            .map(|l| insert_course(&env.store, l, Shift::Morning, Level::Beginner, 10))
            .collect();

        for &course in &courses[..3] {
            assert_eq!(
                env.rules.assign_teacher(course, teacher).await.unwrap(),
                AssignmentOutcome::Assigned
            );
        }
        assert_eq!(read_teacher(&env.store, teacher).assigned_course_count, 3);

        let err = env.rules.assign_teacher(courses[3], teacher).await.unwrap_err();
        assert_eq!(
            rule(err),
            RuleViolation::TeacherQuotaExceeded {
                teacher_id: teacher,
                limit: 3
            }
        );
        assert_eq!(read_course(&env.store, courses[3]).teacher_id, None);
    }

    #[tokio::test]
    async fn test_assign_same_teacher_twice_is_noop() {
        let env = setup_env();
        let teacher = insert_teacher(&env.store, "Ivo Lima");
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);

        env.rules.assign_teacher(course, teacher).await.unwrap();
        let outcome = env.rules.assign_teacher(course, teacher).await.unwrap();

        assert_eq!(outcome, AssignmentOutcome::AlreadyAssigned);
        assert_eq!(read_teacher(&env.store, teacher).assigned_course_count, 1);
    }

    #[tokio::test]
    async fn test_assign_rejects_occupied_course_and_inactive_teacher() {
        let env = setup_env();
        let first = insert_teacher(&env.store, "Joana Reis");
        let second = insert_teacher(&env.store, "Kai Souza");
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);

        env.rules.assign_teacher(course, first).await.unwrap();
        let err = env.rules.assign_teacher(course, second).await.unwrap_err();
        assert_eq!(
            rule(err),
            RuleViolation::CourseAlreadyAssigned {
                course_id: course,
                teacher_id: first
            }
        );

        let other_course = insert_course(&env.store, "Korean", Shift::Morning, Level::Beginner, 10);
        env.store
            .unit_of_work(|conn| {
                conn.execute(
                    "UPDATE teacher SET status = 'INACTIVE' WHERE teacher_id = ?1",
                    params![second],
                )
                .map_err(RepositoryError::from)
            })
            .unwrap();
        let err = env.rules.assign_teacher(other_course, second).await.unwrap_err();
        assert_eq!(rule(err), RuleViolation::TeacherInactive { teacher_id: second });
    }

    #[tokio::test]
    async fn test_unassign_decrements_teacher_count() {
        let env = setup_env();
        let teacher = insert_teacher(&env.store, "Lara Dias");
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);
        env.rules.assign_teacher(course, teacher).await.unwrap();

        assert_eq!(env.rules.unassign_teacher(course).await.unwrap(), Some(teacher));
        assert_eq!(read_teacher(&env.store, teacher).assigned_course_count, 0);
        assert_eq!(read_course(&env.store, course).teacher_id, None);

        // 没有教师时解除是空操作
        assert_eq!(env.rules.unassign_teacher(course).await.unwrap(), None);
        assert_eq!(read_teacher(&env.store, teacher).assigned_course_count, 0);
    }

    #[tokio::test]
    async fn test_rejected_enroll_leaves_no_partial_writes() {
        let env = setup_env();
        let student = insert_student(&env.store, "Mia");
        let course = insert_course(&env.store, "Japanese", Shift::Morning, Level::Beginner, 10);
        let same_language = insert_course(&env.store, "Japanese", Shift::Evening, Level::Beginner, 10);
        env.rules.enroll_student(student, course).await.unwrap();

        let _ = env.rules.enroll_student(student, same_language).await.unwrap_err();

        let (rows, course_count) = env
            .store
            .read(|conn| {
                let rows = StudentRepository::list_by_course(conn, same_language)?.len();
                let course = CourseRepository::get(conn, same_language)?;
                Ok::<_, RepositoryError>((rows, course.enrolled_student_count))
            })
            .unwrap();
        assert_eq!(rows, 0);
        assert_eq!(course_count, 0);
        assert_eq!(read_student(&env.store, student).enrolled_course_count, 1);
    }
}

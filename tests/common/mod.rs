#![allow(dead_code)]

use std::future::{Future, ready};

use chrono::{TimeZone, Utc};
use course_search::domain::course::{Course, CourseType};
use course_search::repository::errors::{RepositoryError, RepositoryResult};
use course_search::repository::memory::InMemoryCourseRepository;
use course_search::repository::{CourseReader, CourseSearchQuery};

pub fn math_basics() -> Course {
    Course {
        id: "1".to_string(),
        title: "Math Basics".to_string(),
        description: "Learn basic mathematics".to_string(),
        category: "Math".to_string(),
        course_type: CourseType::Course,
        grade_range: "1st-3rd".to_string(),
        min_age: 6,
        max_age: 9,
        price: 100.0,
        next_session_date: Utc.with_ymd_and_hms(2030, 1, 8, 10, 0, 0).unwrap(),
    }
}

pub fn science_fun() -> Course {
    Course {
        id: "2".to_string(),
        title: "Science Fun".to_string(),
        description: "Exciting science experiments".to_string(),
        category: "Science".to_string(),
        course_type: CourseType::OneTime,
        grade_range: "4th-6th".to_string(),
        min_age: 9,
        max_age: 12,
        price: 75.0,
        next_session_date: Utc.with_ymd_and_hms(2030, 1, 15, 10, 0, 0).unwrap(),
    }
}

/// Index holding the two reference courses.
pub fn seeded_repository() -> InMemoryCourseRepository {
    InMemoryCourseRepository::with_courses(vec![math_basics(), science_fun()])
}

/// Engine that is never reachable.
pub struct UnreachableRepository;

impl CourseReader for UnreachableRepository {
    fn search_courses(
        &self,
        _query: &CourseSearchQuery,
    ) -> impl Future<Output = RepositoryResult<(usize, Vec<Course>)>> + Send {
        ready(Err(RepositoryError::ConnectionError(
            "engine down".to_string(),
        )))
    }

    fn suggest_courses(
        &self,
        _prefix: &str,
        _limit: usize,
    ) -> impl Future<Output = RepositoryResult<Vec<Course>>> + Send {
        ready(Err(RepositoryError::ConnectionError(
            "engine down".to_string(),
        )))
    }
}

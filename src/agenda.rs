use uuid::Uuid;

use crate::store::data::Meeting;

pub struct DayAgenda {
    pub day: time::Date,
    pub meetings: Vec<Meeting>,
}

/// Group an ascending-by-`start_at` meeting list by calendar day, keeping the
/// order within each day.
pub fn group_by_day(meetings: impl IntoIterator<Item = Meeting>) -> Vec<DayAgenda> {
    let mut days = Vec::<DayAgenda>::new();

    for meeting in meetings {
        let day = meeting.start_at.date();
        match days.last_mut() {
            Some(agenda) if agenda.day == day => agenda.meetings.push(meeting),
            _ => days.push(DayAgenda {
                day,
                meetings: vec![meeting],
            }),
        }
    }

    days
}

/// Display name of the other party: the mentor when the user is the meeting's
/// student, the student otherwise.
pub fn counterpart(meeting: &Meeting, user_id: Uuid) -> Option<&str> {
    let is_student = meeting
        .student
        .as_ref()
        .is_some_and(|person| person.id == user_id);

    let other = if is_student {
        meeting.mentor.as_ref()
    } else {
        meeting.student.as_ref()
    };

    other.map(|person| person.display_name.as_str())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::store::data::Person;

    use super::*;

    fn meeting(
        start: time::OffsetDateTime,
        student: (Uuid, &str),
        mentor: (Uuid, &str),
    ) -> Meeting {
        Meeting {
            id: Uuid::new_v4(),
            start_at: start,
            end_at: start + time::Duration::hours(1),
            student: Some(Person {
                id: student.0,
                display_name: student.1.to_string(),
            }),
            mentor: Some(Person {
                id: mentor.0,
                display_name: mentor.1.to_string(),
            }),
        }
    }

    #[test]
    fn splits_on_day_boundaries() {
        let student = (Uuid::new_v4(), "ana");
        let mentor = (Uuid::new_v4(), "rui");

        let days = group_by_day([
            meeting(datetime!(2024-03-01 09:00 UTC), student, mentor),
            meeting(datetime!(2024-03-01 15:00 UTC), student, mentor),
            meeting(datetime!(2024-03-02 10:00 UTC), student, mentor),
        ]);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, datetime!(2024-03-01 00:00 UTC).date());
        assert_eq!(days[0].meetings.len(), 2);
        assert_eq!(days[1].meetings.len(), 1);
    }

    #[test]
    fn counterpart_depends_on_role_in_the_meeting() {
        let student = (Uuid::new_v4(), "ana");
        let mentor = (Uuid::new_v4(), "rui");
        let meeting = meeting(datetime!(2024-03-01 09:00 UTC), student, mentor);

        assert_eq!(counterpart(&meeting, student.0), Some("rui"));
        assert_eq!(counterpart(&meeting, mentor.0), Some("ana"));
    }
}

//! In-process storage backing the server, the demo, and the tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{
    Job, JobApplication, JobApplicationId, JobId, NewJob, NewJobApplication, NewUser,
    NewVerificationRequest, RequestId, ResumeRef, UserAccount, UserId, VerificationRequest,
    VerificationState,
};
use super::repository::{
    AccountRepository, JobRepository, RepositoryError, ResumeStore, ResumeStoreError,
    ResumeUpload, VerificationRepository,
};
use crate::auth::Role;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, UserAccount>,
    jobs: BTreeMap<JobId, Job>,
    applications: BTreeMap<JobApplicationId, JobApplication>,
    requests: BTreeMap<RequestId, VerificationRequest>,
    next_user: u64,
    next_job: u64,
    next_application: u64,
    next_request: u64,
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryBoardStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryBoardStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl AccountRepository for InMemoryBoardStore {
    fn insert_user(&self, user: NewUser) -> Result<UserAccount, RepositoryError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepositoryError::Conflict);
        }

        let id = UserId(next_id(&mut tables.next_user));
        let account = UserAccount {
            id,
            email: user.email,
            password: user.password,
            profile: user.profile,
            created_at: Utc::now(),
        };
        tables.users.insert(id, account.clone());
        Ok(account)
    }

    fn update_user(&self, user: UserAccount) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        match tables.users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn universities(&self) -> Result<Vec<UserAccount>, RepositoryError> {
        Ok(self
            .lock()?
            .users
            .values()
            .filter(|user| user.role() == Role::University)
            .cloned()
            .collect())
    }
}

impl JobRepository for InMemoryBoardStore {
    fn insert_job(&self, job: NewJob) -> Result<Job, RepositoryError> {
        let mut tables = self.lock()?;
        let id = JobId(next_id(&mut tables.next_job));
        let job = Job {
            id,
            employer_id: job.employer_id,
            title: job.title,
            description: job.description,
            posted_at: Utc::now(),
        };
        tables.jobs.insert(id, job.clone());
        Ok(job)
    }

    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.lock()?.jobs.get(&id).cloned())
    }

    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.lock()?.jobs.values().cloned().collect())
    }

    fn jobs_for_employer(&self, employer_id: UserId) -> Result<Vec<Job>, RepositoryError> {
        Ok(self
            .lock()?
            .jobs
            .values()
            .filter(|job| job.employer_id == employer_id)
            .cloned()
            .collect())
    }

    fn insert_application(
        &self,
        application: NewJobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.jobs.contains_key(&application.job_id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.applications.values().any(|existing| {
            existing.job_id == application.job_id
                && existing.applicant_id == application.applicant_id
        }) {
            return Err(RepositoryError::Conflict);
        }

        let id = JobApplicationId(next_id(&mut tables.next_application));
        let application = JobApplication {
            id,
            job_id: application.job_id,
            applicant_id: application.applicant_id,
            cover_letter: application.cover_letter,
            applied_at: Utc::now(),
        };
        tables.applications.insert(id, application.clone());
        Ok(application)
    }

    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<JobApplication>, RepositoryError> {
        Ok(self
            .lock()?
            .applications
            .values()
            .filter(|application| application.job_id == job_id)
            .cloned()
            .collect())
    }

    fn applications_for_applicant(
        &self,
        applicant_id: UserId,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        Ok(self
            .lock()?
            .applications
            .values()
            .filter(|application| application.applicant_id == applicant_id)
            .cloned()
            .collect())
    }
}

impl VerificationRepository for InMemoryBoardStore {
    fn insert_request(
        &self,
        request: NewVerificationRequest,
    ) -> Result<VerificationRequest, RepositoryError> {
        let mut tables = self.lock()?;
        let id = RequestId(next_id(&mut tables.next_request));
        let request = VerificationRequest {
            id,
            employer_id: request.employer_id,
            university_id: request.university_id,
            student_name: request.student_name,
            issuing_institution_name: request.issuing_institution_name,
            degree: request.degree,
            year: request.year,
            requested_at: Utc::now(),
            state: VerificationState::Pending,
        };
        tables.requests.insert(id, request.clone());
        Ok(request)
    }

    fn update_request(&self, request: VerificationRequest) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        match tables.requests.get_mut(&request.id) {
            Some(slot) => {
                *slot = request;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn transition_request<E, F>(&self, id: RequestId, change: F) -> Result<VerificationRequest, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut VerificationRequest) -> Result<(), E>,
    {
        let mut tables = self.lock()?;
        let slot = tables
            .requests
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        let mut next = slot.clone();
        change(&mut next)?;
        *slot = next.clone();
        Ok(next)
    }

    fn fetch_request(&self, id: RequestId) -> Result<Option<VerificationRequest>, RepositoryError> {
        Ok(self.lock()?.requests.get(&id).cloned())
    }

    fn find_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<VerificationRequest>, RepositoryError> {
        Ok(self
            .lock()?
            .requests
            .values()
            .find(|request| request.fingerprint() == Some(fingerprint))
            .cloned())
    }

    fn requests_for_university(
        &self,
        university_id: UserId,
    ) -> Result<Vec<VerificationRequest>, RepositoryError> {
        Ok(self
            .lock()?
            .requests
            .values()
            .filter(|request| request.university_id == university_id)
            .cloned()
            .collect())
    }

    fn requests_for_employer(
        &self,
        employer_id: UserId,
    ) -> Result<Vec<VerificationRequest>, RepositoryError> {
        Ok(self
            .lock()?
            .requests
            .values()
            .filter(|request| request.employer_id == employer_id)
            .cloned()
            .collect())
    }
}

/// Keeps uploaded resumes in memory; `path` is a `memory://` key.
#[derive(Debug, Default, Clone)]
pub struct InMemoryResumeStore {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryResumeStore {
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().ok()?.get(path).cloned()
    }
}

impl ResumeStore for InMemoryResumeStore {
    fn save(&self, upload: ResumeUpload) -> Result<ResumeRef, ResumeStoreError> {
        let path = format!("memory://resumes/{}", upload.file_name);
        let size_bytes = upload.bytes.len() as u64;
        self.files
            .lock()
            .map_err(|_| ResumeStoreError::Unavailable("resume lock poisoned".to_string()))?
            .insert(path.clone(), upload.bytes);

        Ok(ResumeRef {
            path,
            content_type: upload.content_type,
            size_bytes,
            uploaded_at: Utc::now(),
        })
    }

    fn remove(&self, path: &str) -> Result<(), ResumeStoreError> {
        self.files
            .lock()
            .map_err(|_| ResumeStoreError::Unavailable("resume lock poisoned".to_string()))?
            .remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::domain::{AlreadyDecided, VerificationStatus};
    use crate::board::error::BoardError;

    fn new_request() -> NewVerificationRequest {
        NewVerificationRequest {
            employer_id: UserId(2),
            university_id: UserId(1),
            student_name: "Jane Doe".to_string(),
            issuing_institution_name: "State Tech University".to_string(),
            degree: "B.Sc. Computer Science".to_string(),
            year: 2023,
        }
    }

    fn poison(store: &InMemoryBoardStore) {
        let tables = store.tables.clone();
        let outcome = std::thread::spawn(move || {
            let _held = tables.lock().expect("first lock");
            panic!("writer died holding the tables");
        })
        .join();
        assert!(outcome.is_err());
        assert!(store.tables.is_poisoned());
    }

    #[test]
    fn poisoned_tables_report_unavailable() {
        let store = InMemoryBoardStore::default();
        store
            .insert_job(NewJob {
                employer_id: UserId(2),
                title: "Engineer".to_string(),
                description: String::new(),
            })
            .expect("insert before poisoning");
        poison(&store);

        assert!(matches!(store.list_jobs(), Err(RepositoryError::Unavailable(_))));
        assert!(matches!(
            store.insert_request(new_request()),
            Err(RepositoryError::Unavailable(_))
        ));
        assert!(matches!(
            store.find_user_by_email("jane@example.test"),
            Err(RepositoryError::Unavailable(_))
        ));
        let transition: Result<VerificationRequest, RepositoryError> =
            store.transition_request(RequestId(1), |_| Ok(()));
        assert!(matches!(transition, Err(RepositoryError::Unavailable(_))));
    }

    #[test]
    fn failed_transition_leaves_the_row_untouched() {
        let store = InMemoryBoardStore::default();
        let request = store.insert_request(new_request()).expect("inserted");

        let outcome: Result<VerificationRequest, BoardError> =
            store.transition_request(request.id, |request| {
                request.degree = "M.Sc. Forgery".to_string();
                Err(AlreadyDecided {
                    current: VerificationStatus::Pending,
                }
                .into())
            });
        assert!(outcome.is_err());

        let stored = store
            .fetch_request(request.id)
            .expect("store reachable")
            .expect("request stored");
        assert_eq!(stored, request);
    }

    #[test]
    fn transition_of_a_missing_request_is_not_found() {
        let store = InMemoryBoardStore::default();
        let outcome: Result<VerificationRequest, RepositoryError> =
            store.transition_request(RequestId(7), |_| Ok(()));
        assert!(matches!(outcome, Err(RepositoryError::NotFound)));
    }

    #[test]
    fn removing_a_resume_forgets_its_bytes() {
        let resumes = InMemoryResumeStore::default();
        let stored = resumes
            .save(ResumeUpload {
                owner: UserId(3),
                file_name: "user_3_cv.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                bytes: b"%PDF".to_vec(),
            })
            .expect("saved");
        assert!(resumes.contents(&stored.path).is_some());

        resumes.remove(&stored.path).expect("removed");
        resumes.remove(&stored.path).expect("second remove is a no-op");
        assert!(resumes.contents(&stored.path).is_none());
    }
}

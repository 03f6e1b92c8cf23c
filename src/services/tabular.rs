//! CSV export and import for customers and loans
//!
//! Export writes one header row followed by one row per record. Import is
//! lenient about column names: each field is looked up under a list of
//! aliases and the first non-empty value wins. Rows are numbered as a
//! spreadsheet would show them, so the first data row is row 2.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    CreateCustomerRequest, CreateLoanRequest, Customer, CustomerStatus, LoanStatus, LoanTerm,
    LoanWithCustomer,
};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const DEFAULT_ID_TYPE: &str = "National ID";

/// A record that can be written as one CSV row
pub trait CsvRecord {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

impl CsvRecord for Customer {
    fn headers() -> &'static [&'static str] {
        &[
            "Customer ID",
            "Full Name",
            "Contact Number",
            "Address",
            "ID Type",
            "ID Number",
            "Date Registered",
            "Status",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name.clone(),
            self.contact_number.clone(),
            self.address.clone(),
            self.id_type.clone(),
            self.id_number.clone(),
            self.date_registered.to_string(),
            self.status.as_str().to_string(),
        ]
    }
}

impl CsvRecord for LoanWithCustomer {
    fn headers() -> &'static [&'static str] {
        &[
            "Loan ID",
            "Customer ID",
            "Full Name",
            "Contact Number",
            "Loan Amount",
            "Interest Rate",
            "Loan Term",
            "Start Date",
            "End Date",
            "Loan Status",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.customer_id.to_string(),
            self.full_name.clone(),
            self.contact_number.clone(),
            self.loan_amount.to_string(),
            self.interest_rate.to_string(),
            self.loan_term.as_str().to_string(),
            self.start_date.to_string(),
            self.end_date.to_string(),
            self.loan_status.as_str().to_string(),
        ]
    }
}

/// Serialize records to CSV bytes, header first
pub fn to_csv<T: CsvRecord>(records: &[T]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(T::headers())?;
    for record in records {
        writer.write_record(record.row())?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Download file name such as `customers_2024-05-01.csv`
pub fn export_filename(entity: &str, today: NaiveDate) -> String {
    format!("{}_{}.csv", entity, today.format("%Y-%m-%d"))
}

/// Rows that parsed and validated, plus one message per rejected row
#[derive(Debug)]
pub struct ParsedImport<T> {
    pub rows: Vec<(usize, T)>,
    pub errors: Vec<String>,
}

impl<T> Default for ParsedImport<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            errors: Vec::new(),
        }
    }
}

mod customer_columns {
    pub const FULL_NAME: &[&str] = &["Full Name", "full_name", "FullName", "Name", "name"];
    pub const CONTACT: &[&str] = &[
        "Contact Number",
        "contact_number",
        "ContactNumber",
        "Phone",
        "phone",
        "Contact",
    ];
    pub const ADDRESS: &[&str] = &["Address", "address"];
    pub const ID_TYPE: &[&str] = &["ID Type", "id_type", "IDType", "Id Type"];
    pub const ID_NUMBER: &[&str] = &["ID Number", "id_number", "IDNumber", "Id Number"];
    pub const DATE_REGISTERED: &[&str] = &["Date Registered", "date_registered", "DateRegistered"];
    pub const STATUS: &[&str] = &["Status", "status"];
}

mod loan_columns {
    pub const CUSTOMER_ID: &[&str] = &["Customer ID", "customer_id", "CustomerID", "Customer Id"];
    pub const AMOUNT: &[&str] = &["Loan Amount", "loan_amount", "LoanAmount", "Amount", "amount"];
    pub const RATE: &[&str] = &["Interest Rate", "interest_rate", "InterestRate", "Rate", "rate"];
    pub const TERM: &[&str] = &["Loan Term", "loan_term", "LoanTerm", "Term", "term"];
    pub const START_DATE: &[&str] = &["Start Date", "start_date", "StartDate"];
    pub const END_DATE: &[&str] = &["End Date", "end_date", "EndDate"];
    pub const STATUS: &[&str] = &["Loan Status", "loan_status", "LoanStatus", "Status", "status"];
}

/// One data row with its header lookup
struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a csv::StringRecord,
}

impl<'a> Row<'a> {
    fn get(&self, aliases: &[&str]) -> Option<&'a str> {
        aliases.iter().find_map(|alias| {
            self.columns
                .get(*alias)
                .and_then(|&idx| self.record.get(idx))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
    }

    fn date(&self, aliases: &[&str], label: &str) -> Result<Option<NaiveDate>, String> {
        self.get(aliases)
            .map(|v| {
                NaiveDate::parse_from_str(v, "%Y-%m-%d")
                    .map_err(|_| format!("Invalid {} '{}', expected YYYY-MM-DD", label, v))
            })
            .transpose()
    }
}

fn read_rows<T>(
    body: &[u8],
    mut parse: impl FnMut(&Row<'_>) -> Result<T, String>,
) -> Result<ParsedImport<T>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body);

    let columns: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim_start_matches('\u{feff}').to_string(), idx))
        .collect();

    let mut parsed = ParsedImport::default();
    for (idx, record) in reader.records().enumerate() {
        let row_number = idx + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                parsed.errors.push(format!("Row {}: {}", row_number, e));
                continue;
            }
        };

        let row = Row {
            columns: &columns,
            record: &record,
        };
        match parse(&row) {
            Ok(value) => parsed.rows.push((row_number, value)),
            Err(message) => parsed.errors.push(format!("Row {}: {}", row_number, message)),
        }
    }

    Ok(parsed)
}

/// Parse a customer import file into create requests
pub fn parse_customer_import(
    body: &[u8],
    today: NaiveDate,
) -> Result<ParsedImport<CreateCustomerRequest>, csv::Error> {
    use customer_columns::*;

    read_rows(body, |row| {
        let (Some(full_name), Some(contact_number), Some(address), Some(id_number)) = (
            row.get(FULL_NAME),
            row.get(CONTACT),
            row.get(ADDRESS),
            row.get(ID_NUMBER),
        ) else {
            return Err("Missing required fields".to_string());
        };

        let status = match row.get(STATUS) {
            Some(raw) => CustomerStatus::parse(raw)
                .ok_or_else(|| format!("Unknown customer status '{}'", raw))?,
            None => CustomerStatus::Active,
        };

        let request = CreateCustomerRequest {
            full_name: full_name.to_string(),
            contact_number: contact_number.to_string(),
            address: address.to_string(),
            id_type: row.get(ID_TYPE).unwrap_or(DEFAULT_ID_TYPE).to_string(),
            id_number: id_number.to_string(),
            date_registered: row.date(DATE_REGISTERED, "registration date")?.unwrap_or(today),
            status: Some(status),
        };
        request.validate().map_err(|e| e.to_string())?;
        Ok(request)
    })
}

/// Parse a loan import file into create requests.
///
/// Customer existence is checked by the caller when inserting.
pub fn parse_loan_import(
    body: &[u8],
    today: NaiveDate,
) -> Result<ParsedImport<CreateLoanRequest>, csv::Error> {
    use loan_columns::*;

    read_rows(body, |row| {
        let (Some(customer_id), Some(amount), Some(_)) =
            (row.get(CUSTOMER_ID), row.get(AMOUNT), row.get(END_DATE))
        else {
            return Err("Missing required fields (Customer ID, Loan Amount, End Date)".to_string());
        };

        let customer_id = Uuid::parse_str(customer_id)
            .map_err(|_| format!("Invalid Customer ID '{}'", customer_id))?;
        let loan_amount = parse_decimal(amount, "loan amount")?;
        let interest_rate = match row.get(RATE) {
            Some(raw) => parse_decimal(raw, "interest rate")?,
            None => Decimal::ZERO,
        };
        let loan_term = match row.get(TERM) {
            Some(raw) => LoanTerm::parse(raw).ok_or_else(|| format!("Unknown loan term '{}'", raw))?,
            None => LoanTerm::Monthly,
        };
        let loan_status = match row.get(STATUS) {
            Some(raw) => {
                LoanStatus::parse(raw).ok_or_else(|| format!("Unknown loan status '{}'", raw))?
            }
            None => LoanStatus::Pending,
        };

        let start_date = row.date(START_DATE, "start date")?.unwrap_or(today);
        let end_date = row
            .date(END_DATE, "end date")?
            .ok_or_else(|| "Missing End Date".to_string())?;

        let request = CreateLoanRequest {
            customer_id,
            loan_amount,
            interest_rate,
            loan_term,
            start_date,
            end_date,
            loan_status: Some(loan_status),
        };
        request.validate().map_err(|e| e.to_string())?;
        Ok(request)
    })
}

fn parse_decimal(raw: &str, label: &str) -> Result<Decimal, String> {
    Decimal::from_str(&raw.replace(',', ""))
        .map_err(|_| format!("Invalid {} '{}'", label, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_customer_import_accepts_aliases_and_defaults() {
        let csv = "Name,Phone,address,IDNumber\nMaria Santos,0917 000 1111,Quezon City,A-123\n";
        let parsed = parse_customer_import(csv.as_bytes(), today()).unwrap();

        assert!(parsed.errors.is_empty());
        let (row, customer) = &parsed.rows[0];
        assert_eq!(*row, 2);
        assert_eq!(customer.full_name, "Maria Santos");
        assert_eq!(customer.contact_number, "0917 000 1111");
        assert_eq!(customer.id_type, "National ID");
        assert_eq!(customer.date_registered, today());
        assert_eq!(customer.status, Some(CustomerStatus::Active));
    }

    #[test]
    fn test_customer_import_reports_bad_rows_and_keeps_good_ones() {
        let csv = "Full Name,Contact Number,Address,ID Number,Status\n\
                   Ana Cruz,0917,Manila,B-1,Active\n\
                   ,0918,Cebu,B-2,Active\n\
                   Ben Reyes,0919,Davao,B-3,Archived\n";
        let parsed = parse_customer_import(csv.as_bytes(), today()).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0], "Row 3: Missing required fields");
        assert!(parsed.errors[1].starts_with("Row 4: Unknown customer status"));
    }

    #[test]
    fn test_loan_import_defaults() {
        let customer = Uuid::new_v4();
        let csv = format!("Customer ID,Amount,End Date\n{},\"5,000.00\",2024-12-31\n", customer);
        let parsed = parse_loan_import(csv.as_bytes(), today()).unwrap();

        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let (_, loan) = &parsed.rows[0];
        assert_eq!(loan.customer_id, customer);
        assert_eq!(loan.loan_amount, dec!(5000.00));
        assert_eq!(loan.interest_rate, Decimal::ZERO);
        assert_eq!(loan.loan_term, LoanTerm::Monthly);
        assert_eq!(loan.start_date, today());
        assert_eq!(loan.loan_status, Some(LoanStatus::Pending));
    }

    #[test]
    fn test_loan_import_requires_core_columns() {
        let csv = format!(
            "customer_id,loan_amount,end_date\n{},1000,\nnot-a-uuid,1000,2024-12-31\n{},-5,2024-12-31\n",
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let parsed = parse_loan_import(csv.as_bytes(), today()).unwrap();

        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.errors.len(), 3);
        assert!(parsed.errors[0].contains("Missing required fields"));
        assert!(parsed.errors[1].contains("Invalid Customer ID"));
        assert!(parsed.errors[2].starts_with("Row 4"));
    }

    #[test]
    fn test_export_headers_match_import_aliases() {
        let customer = Customer {
            id: Uuid::new_v4(),
            full_name: "Ana Cruz".to_string(),
            contact_number: "0917".to_string(),
            address: "Manila, PH".to_string(),
            id_type: "Passport".to_string(),
            id_number: "P-1".to_string(),
            date_registered: today(),
            status: CustomerStatus::Inactive,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let bytes = to_csv(&[customer]).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("Customer ID,Full Name,Contact Number,Address,ID Type"));
        assert!(text.contains("\"Manila, PH\""));

        let parsed = parse_customer_import(&bytes, today()).unwrap();
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.rows[0].1.id_type, "Passport");
        assert_eq!(parsed.rows[0].1.status, Some(CustomerStatus::Inactive));
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("loans", today()), "loans_2024-05-01.csv");
    }
}
